//! Offline keyword classifier used when the language service cannot answer.

use cartograph_core::intent::{Intent, PrimaryIntent, RelationshipType, ResourceType};

const EC2: &[&str] = &["instance", "ec2"];
const S3: &[&str] = &["bucket", "s3"];
const SECURITY_GROUP: &[&str] = &["security", "group"];
const VPC: &[&str] = &["vpc"];
const IAM: &[&str] = &["role", "iam"];

const SECURITY: &[&str] = &["security"];
const PUBLIC: &[&str] = &["public"];
const EXPOSURE: &[&str] = &["rule", "allow", "internet"];
const ADMIN: &[&str] = &["admin"];

struct Tokens(Vec<String>);

impl Tokens {
    fn new(text: &str) -> Self {
        Self(
            text.to_lowercase()
                .split(|c: char| !c.is_alphanumeric())
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// A keyword matches any token that starts with it ("instances", "roles").
    fn mention(&self, keywords: &[&str]) -> bool {
        self.0
            .iter()
            .any(|token| keywords.iter().any(|k| token.starts_with(k)))
    }
}

/// Picks a canned intent from domain keywords and secondary qualifiers.
///
/// Deterministic for a given input; never fails. Text with no domain keyword
/// gets the general overview intent.
pub fn classify_by_keywords(text: &str) -> Intent {
    let tokens = Tokens::new(text);

    if tokens.mention(EC2) {
        return if tokens.mention(S3) {
            Intent::primary(PrimaryIntent::Ec2ToS3Access)
        } else if tokens.mention(VPC) {
            Intent::primary(PrimaryIntent::VpcResources)
        } else if tokens.mention(SECURITY) {
            Intent::relationship(RelationshipType::ProtectedBy)
        } else if tokens.mention(IAM) {
            Intent::relationship(RelationshipType::Assumes)
        } else {
            Intent::resource(ResourceType::Ec2)
        };
    }

    if tokens.mention(S3) {
        return if tokens.mention(PUBLIC) {
            Intent::relationship(RelationshipType::Access)
        } else {
            Intent::resource(ResourceType::S3)
        };
    }

    if tokens.mention(SECURITY_GROUP) {
        return if tokens.mention(EXPOSURE) {
            Intent::primary(PrimaryIntent::SecurityGroupResources)
        } else {
            Intent::resource(ResourceType::Sg)
        };
    }

    if tokens.mention(VPC) {
        return Intent::primary(PrimaryIntent::VpcResources);
    }

    if tokens.mention(IAM) {
        return if tokens.mention(ADMIN) {
            Intent::primary(PrimaryIntent::IamPermissions)
        } else {
            Intent::resource(ResourceType::Iam)
        };
    }

    Intent::general()
}
