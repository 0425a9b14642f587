use serde::{Deserialize, Serialize};

/// Primary label used by canned intents that are scoped to a resource type.
pub const RESOURCE_LOOKUP: &str = "resource_lookup";
/// Primary label used by canned intents that are scoped to a relationship type.
pub const RELATIONSHIP_LOOKUP: &str = "relationship_lookup";
/// Primary label for classifier answers that named a scope but no intent.
pub const UNSPECIFIED: &str = "unspecified";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryIntent {
    Ec2ToS3Access,
    SecurityGroupResources,
    VpcResources,
    IamPermissions,
    GeneralResources,
}

impl PrimaryIntent {
    pub const ALL: [PrimaryIntent; 5] = [
        PrimaryIntent::Ec2ToS3Access,
        PrimaryIntent::SecurityGroupResources,
        PrimaryIntent::VpcResources,
        PrimaryIntent::IamPermissions,
        PrimaryIntent::GeneralResources,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PrimaryIntent::Ec2ToS3Access => "ec2_to_s3_access",
            PrimaryIntent::SecurityGroupResources => "security_group_resources",
            PrimaryIntent::VpcResources => "vpc_resources",
            PrimaryIntent::IamPermissions => "iam_permissions",
            PrimaryIntent::GeneralResources => "general_resources",
        }
    }

    /// One-line meaning shown to the language service.
    pub fn hint(&self) -> &'static str {
        match self {
            PrimaryIntent::Ec2ToS3Access => "Queries about EC2 instances accessing S3 buckets",
            PrimaryIntent::SecurityGroupResources => {
                "Queries about security groups and protected resources"
            }
            PrimaryIntent::VpcResources => "Queries about resources in VPCs",
            PrimaryIntent::IamPermissions => "Queries about IAM roles and permissions",
            PrimaryIntent::GeneralResources => "General queries about cloud resources",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let key = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|i| i.as_str() == key)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Ec2,
    S3,
    Sg,
    Vpc,
    Iam,
}

impl ResourceType {
    pub const ALL: [ResourceType; 5] = [
        ResourceType::Ec2,
        ResourceType::S3,
        ResourceType::Sg,
        ResourceType::Vpc,
        ResourceType::Iam,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Ec2 => "ec2",
            ResourceType::S3 => "s3",
            ResourceType::Sg => "sg",
            ResourceType::Vpc => "vpc",
            ResourceType::Iam => "iam",
        }
    }

    pub fn hint(&self) -> &'static str {
        match self {
            ResourceType::Ec2 => "EC2 instances",
            ResourceType::S3 => "S3 buckets",
            ResourceType::Sg => "Security groups",
            ResourceType::Vpc => "VPCs",
            ResourceType::Iam => "IAM roles",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let key = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|r| r.as_str() == key)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    Access,
    BelongsTo,
    LocatedIn,
    Assumes,
    ProtectedBy,
}

impl RelationshipType {
    pub const ALL: [RelationshipType; 5] = [
        RelationshipType::Access,
        RelationshipType::BelongsTo,
        RelationshipType::LocatedIn,
        RelationshipType::Assumes,
        RelationshipType::ProtectedBy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipType::Access => "access",
            RelationshipType::BelongsTo => "belongs_to",
            RelationshipType::LocatedIn => "located_in",
            RelationshipType::Assumes => "assumes",
            RelationshipType::ProtectedBy => "protected_by",
        }
    }

    pub fn hint(&self) -> &'static str {
        match self {
            RelationshipType::Access => "Resources with access to other resources",
            RelationshipType::BelongsTo => "Resources that belong to other resources",
            RelationshipType::LocatedIn => "Resources located in regions or subnets",
            RelationshipType::Assumes => "EC2 instances assuming IAM roles",
            RelationshipType::ProtectedBy => "Resources protected by security groups",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let key = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|r| r.as_str() == key)
    }
}

/// The classified purpose of a free-text query.
///
/// Fields stay plain strings: the language service may answer with keys
/// outside the closed vocabularies, and the template catalog resolves those
/// to its default instead of rejecting them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Intent {
    pub primary: String,
    pub resource_type: Option<String>,
    pub relationship_type: Option<String>,
}

impl Intent {
    pub fn general() -> Self {
        Self::primary(PrimaryIntent::GeneralResources)
    }

    pub fn primary(intent: PrimaryIntent) -> Self {
        Self {
            primary: intent.as_str().to_string(),
            resource_type: None,
            relationship_type: None,
        }
    }

    pub fn resource(resource_type: ResourceType) -> Self {
        Self {
            primary: RESOURCE_LOOKUP.to_string(),
            resource_type: Some(resource_type.as_str().to_string()),
            relationship_type: None,
        }
    }

    pub fn relationship(relationship_type: RelationshipType) -> Self {
        Self {
            primary: RELATIONSHIP_LOOKUP.to_string(),
            resource_type: None,
            relationship_type: Some(relationship_type.as_str().to_string()),
        }
    }

    /// The primary label, when it is one of the enumerated intents.
    pub fn primary_intent(&self) -> Option<PrimaryIntent> {
        PrimaryIntent::parse(&self.primary)
    }
}

impl Default for Intent {
    fn default() -> Self {
        Self::general()
    }
}

/// Outcome of one classification call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Classification {
    pub intent: Intent,
    /// Set when the keyword heuristic produced the intent; holds the reason
    /// the language service path failed.
    pub fallback_reason: Option<String>,
}

impl Classification {
    pub fn from_service(intent: Intent) -> Self {
        Self {
            intent,
            fallback_reason: None,
        }
    }

    pub fn from_fallback(intent: Intent, reason: impl Into<String>) -> Self {
        Self {
            intent,
            fallback_reason: Some(reason.into()),
        }
    }

    pub fn used_fallback(&self) -> bool {
        self.fallback_reason.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_intent_parse_is_case_insensitive() {
        assert_eq!(
            PrimaryIntent::parse(" VPC_Resources "),
            Some(PrimaryIntent::VpcResources)
        );
        assert_eq!(PrimaryIntent::parse("resource_lookup"), None);
    }

    #[test]
    fn test_canned_lookup_intents_are_not_enumerated() {
        assert!(Intent::resource(ResourceType::Ec2).primary_intent().is_none());
        assert!(Intent::relationship(RelationshipType::Assumes)
            .primary_intent()
            .is_none());
        assert_eq!(
            Intent::general().primary_intent(),
            Some(PrimaryIntent::GeneralResources)
        );
    }

    #[test]
    fn test_vocabulary_keys_match_serde_names() {
        for r in ResourceType::ALL {
            let json = serde_json::to_value(r).unwrap();
            assert_eq!(json, serde_json::Value::String(r.as_str().to_string()));
        }
        for r in RelationshipType::ALL {
            let json = serde_json::to_value(r).unwrap();
            assert_eq!(json, serde_json::Value::String(r.as_str().to_string()));
        }
    }
}
