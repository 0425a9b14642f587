use std::collections::HashMap;

use cartograph_core::intent::{PrimaryIntent, RelationshipType, ResourceType};
use cartograph_core::plan::Template;

// ---------------------------------------------------------------------------
// Intent templates
// ---------------------------------------------------------------------------

const EC2_TO_S3_ACCESS: Template = Template {
    query_text: "MATCH path = (i:EC2Instance)-[r:HAS_ACCESS_TO]->(b:S3Bucket)
RETURN path, i, r, b
LIMIT 25",
    description: "EC2 instances with access to S3 buckets",
};

const SECURITY_GROUP_RESOURCES: Template = Template {
    query_text: "MATCH path = (sg:SecurityGroup)-[r]->(target)
WHERE target:EC2Instance OR target:S3Bucket OR target:SecurityGroup
RETURN path, sg, r, target
LIMIT 25",
    description: "Security groups and the resources they protect or have access to",
};

const VPC_RESOURCES: Template = Template {
    query_text: "MATCH path = (vpc:VPC)<-[:BELONGS_TO]-(resource)
WHERE resource:EC2Instance OR resource:Subnet OR resource:SecurityGroup
RETURN path, vpc, resource
LIMIT 25",
    description: "Resources that belong to VPCs",
};

const IAM_PERMISSIONS: Template = Template {
    query_text: "MATCH path = (i:EC2Instance)-[:ASSUMES]->(r:IAMRole)-[access:HAS_ACCESS_TO]->(resource)
RETURN path, i, r, access, resource
LIMIT 25",
    description: "IAM roles assumed by EC2 instances and the resources they can access",
};

const GENERAL_RESOURCES: Template = Template {
    query_text: "MATCH (n)
WHERE n:EC2Instance OR n:S3Bucket OR n:SecurityGroup OR n:VPC OR n:IAMRole
WITH n
LIMIT 25
OPTIONAL MATCH (n)-[r]-(m)
RETURN n, r, m",
    description: "General overview of cloud resources and their relationships",
};

// ---------------------------------------------------------------------------
// Resource type templates
// ---------------------------------------------------------------------------

const EC2: Template = Template {
    query_text: "MATCH (i:EC2Instance)
WITH i
LIMIT 25
OPTIONAL MATCH (i)-[r]-(related)
RETURN i, r, related",
    description: "EC2 instances and their relationships",
};

const S3: Template = Template {
    query_text: "MATCH (b:S3Bucket)
WITH b
LIMIT 25
OPTIONAL MATCH (b)-[r]-(related)
RETURN b, r, related",
    description: "S3 buckets and their relationships",
};

const SG: Template = Template {
    query_text: "MATCH (sg:SecurityGroup)
WITH sg
LIMIT 25
OPTIONAL MATCH (sg)-[r]-(related)
RETURN sg, r, related",
    description: "Security groups and their relationships",
};

const VPC: Template = Template {
    query_text: "MATCH (v:VPC)
WITH v
LIMIT 25
OPTIONAL MATCH (v)-[r]-(related)
RETURN v, r, related",
    description: "VPCs and their relationships",
};

const IAM: Template = Template {
    query_text: "MATCH (r:IAMRole)
WITH r
LIMIT 25
OPTIONAL MATCH (r)-[rel]-(related)
RETURN r, rel, related",
    description: "IAM roles and their relationships",
};

// ---------------------------------------------------------------------------
// Relationship type templates
// ---------------------------------------------------------------------------

const ACCESS: Template = Template {
    query_text: "MATCH path = (source)-[r:HAS_ACCESS_TO]->(target)
RETURN path, source, r, target
LIMIT 25",
    description: "Resources with access to other resources",
};

const BELONGS_TO: Template = Template {
    query_text: "MATCH path = (resource)-[r:BELONGS_TO]->(parent)
RETURN path, resource, r, parent
LIMIT 25",
    description: "Resources that belong to other resources",
};

const LOCATED_IN: Template = Template {
    query_text: "MATCH path = (resource)-[r:LOCATED_IN]->(location)
RETURN path, resource, r, location
LIMIT 25",
    description: "Resources located in regions or subnets",
};

const ASSUMES: Template = Template {
    query_text: "MATCH path = (i:EC2Instance)-[r:ASSUMES]->(role:IAMRole)
RETURN path, i, r, role
LIMIT 25",
    description: "EC2 instances assuming IAM roles",
};

const PROTECTED_BY: Template = Template {
    query_text: "MATCH path = (resource)-[r:PROTECTED_BY]->(sg:SecurityGroup)
RETURN path, resource, r, sg
LIMIT 25",
    description: "Resources protected by security groups",
};

// ---------------------------------------------------------------------------
// TemplateCatalog
// ---------------------------------------------------------------------------

/// Read-only registry of query templates in three key namespaces.
///
/// Every lookup is total: keys are trimmed and lower-cased, and anything
/// unknown resolves to the general overview template.
#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    by_intent: HashMap<&'static str, Template>,
    by_resource: HashMap<&'static str, Template>,
    by_relationship: HashMap<&'static str, Template>,
}

impl Default for TemplateCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateCatalog {
    pub fn new() -> Self {
        let by_intent = PrimaryIntent::ALL
            .into_iter()
            .map(|intent| {
                let template = match intent {
                    PrimaryIntent::Ec2ToS3Access => EC2_TO_S3_ACCESS,
                    PrimaryIntent::SecurityGroupResources => SECURITY_GROUP_RESOURCES,
                    PrimaryIntent::VpcResources => VPC_RESOURCES,
                    PrimaryIntent::IamPermissions => IAM_PERMISSIONS,
                    PrimaryIntent::GeneralResources => GENERAL_RESOURCES,
                };
                (intent.as_str(), template)
            })
            .collect();

        let by_resource = ResourceType::ALL
            .into_iter()
            .map(|resource| {
                let template = match resource {
                    ResourceType::Ec2 => EC2,
                    ResourceType::S3 => S3,
                    ResourceType::Sg => SG,
                    ResourceType::Vpc => VPC,
                    ResourceType::Iam => IAM,
                };
                (resource.as_str(), template)
            })
            .collect();

        let by_relationship = RelationshipType::ALL
            .into_iter()
            .map(|relationship| {
                let template = match relationship {
                    RelationshipType::Access => ACCESS,
                    RelationshipType::BelongsTo => BELONGS_TO,
                    RelationshipType::LocatedIn => LOCATED_IN,
                    RelationshipType::Assumes => ASSUMES,
                    RelationshipType::ProtectedBy => PROTECTED_BY,
                };
                (relationship.as_str(), template)
            })
            .collect();

        Self {
            by_intent,
            by_resource,
            by_relationship,
        }
    }

    pub fn default_template(&self) -> &Template {
        &GENERAL_RESOURCES
    }

    pub fn by_intent(&self, name: &str) -> &Template {
        Self::lookup(&self.by_intent, name).unwrap_or(&GENERAL_RESOURCES)
    }

    pub fn by_resource_type(&self, name: &str) -> &Template {
        Self::lookup(&self.by_resource, name).unwrap_or(&GENERAL_RESOURCES)
    }

    pub fn by_relationship_type(&self, name: &str) -> &Template {
        Self::lookup(&self.by_relationship, name).unwrap_or(&GENERAL_RESOURCES)
    }

    fn lookup<'a>(map: &'a HashMap<&'static str, Template>, name: &str) -> Option<&'a Template> {
        let key = name.trim().to_lowercase();
        let found = map.get(key.as_str());
        if found.is_none() {
            tracing::debug!(key = %name, "Unknown template key, using general overview");
        }
        found
    }
}
