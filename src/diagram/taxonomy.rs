//! Service taxonomy for diagram components
//! Classifies free-text shape labels into a closed set of cloud service kinds

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of cloud service categories a diagram component can map to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    Compute,
    StorageObject,
    RelationalDb,
    DocumentDb,
    LoadBalancer,
    Cdn,
    FunctionCompute,
    ApiGateway,
    Dns,
    Identity,
    KeyManagement,
    Secrets,
    EdgeFirewall,
    DdosProtection,
    NetworkIsolation,
    Monitoring,
    Queue,
    Stream,
    Search,
    Warehouse,
    /// Recognisably a cloud shape, but not one of the kinds above
    CloudService,
    Unknown,
}

/// Kinds whose presence or absence moves the security score
pub const SECURITY_RELEVANT: &[ServiceKind] = &[
    ServiceKind::Identity,
    ServiceKind::KeyManagement,
    ServiceKind::Secrets,
    ServiceKind::EdgeFirewall,
    ServiceKind::DdosProtection,
    ServiceKind::NetworkIsolation,
    ServiceKind::StorageObject,
    ServiceKind::Compute,
];

impl ServiceKind {
    pub fn is_security_relevant(self) -> bool {
        SECURITY_RELEVANT.contains(&self)
    }

    /// Singular name used in prose ("1 EC2 instance")
    pub fn display_name(self) -> &'static str {
        self.names().0
    }

    /// Plural name used in prose ("3 EC2 instances")
    pub fn plural_name(self) -> &'static str {
        self.names().1
    }

    /// Short service tag attached to security findings
    pub fn service_tag(self) -> &'static str {
        self.names().2
    }

    fn names(self) -> (&'static str, &'static str, &'static str) {
        match self {
            // Compute
            ServiceKind::Compute => ("EC2 instance", "EC2 instances", "EC2"),
            ServiceKind::FunctionCompute => ("Lambda function", "Lambda functions", "Lambda"),

            // Storage and data
            ServiceKind::StorageObject => ("S3 bucket", "S3 buckets", "S3"),
            ServiceKind::RelationalDb => ("RDS database", "RDS databases", "RDS"),
            ServiceKind::DocumentDb => ("DynamoDB table", "DynamoDB tables", "DynamoDB"),
            ServiceKind::Search => ("OpenSearch cluster", "OpenSearch clusters", "OpenSearch"),
            ServiceKind::Warehouse => (
                "Redshift data warehouse",
                "Redshift data warehouses",
                "Redshift",
            ),

            // Networking
            ServiceKind::LoadBalancer => ("Load Balancer", "Load Balancers", "ELB"),
            ServiceKind::Cdn => (
                "CloudFront distribution",
                "CloudFront distributions",
                "CloudFront",
            ),
            ServiceKind::ApiGateway => ("API Gateway", "API Gateways", "API Gateway"),
            ServiceKind::Dns => ("Route 53 DNS zone", "Route 53 DNS zones", "Route 53"),
            ServiceKind::NetworkIsolation => ("VPC network", "VPC networks", "VPC"),

            // Security
            ServiceKind::Identity => ("IAM service", "IAM services", "IAM"),
            ServiceKind::KeyManagement => (
                "KMS encryption service",
                "KMS encryption services",
                "KMS",
            ),
            ServiceKind::Secrets => (
                "Secrets Manager store",
                "Secrets Manager stores",
                "Secrets Manager",
            ),
            ServiceKind::EdgeFirewall => ("WAF firewall", "WAF firewalls", "WAF"),
            ServiceKind::DdosProtection => ("Shield protection", "Shield protections", "Shield"),

            // Operations and integration
            ServiceKind::Monitoring => ("CloudWatch monitor", "CloudWatch monitors", "CloudWatch"),
            ServiceKind::Queue => ("message queue", "message queues", "SQS"),
            ServiceKind::Stream => ("Kinesis stream", "Kinesis streams", "Kinesis"),

            ServiceKind::CloudService => ("AWS service", "AWS services", "AWS"),
            ServiceKind::Unknown => (
                "unrecognized component",
                "unrecognized components",
                "Unknown",
            ),
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Category group a keyword rule belongs to. Groups are evaluated in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceGroup {
    Compute,
    Storage,
    Database,
    Networking,
    Security,
    Management,
    Integration,
    Analytics,
}

/// One row of the classification table: any keyword hit yields `kind`
#[derive(Debug)]
pub struct KeywordRule {
    pub group: ServiceGroup,
    pub keywords: &'static [&'static str],
    pub kind: ServiceKind,
}

const fn rule(
    group: ServiceGroup,
    keywords: &'static [&'static str],
    kind: ServiceKind,
) -> KeywordRule {
    KeywordRule { group, keywords, kind }
}

/// Ordered classification table. First matching rule wins, so inside each group
/// product names sit above the generic terms they would otherwise lose to.
/// Keywords are lowercase.
pub const KEYWORD_RULES: &[KeywordRule] = &[
    // Compute. Functions sit above the generic instance/server terms so that
    // "Serverless backend" reads as a function, not a server.
    rule(
        ServiceGroup::Compute,
        &["lambda", "serverless", "function", "λ"],
        ServiceKind::FunctionCompute,
    ),
    rule(
        ServiceGroup::Compute,
        &[
            "ec2",
            "ecs",
            "eks",
            "fargate",
            "kubernetes",
            "k8s",
            "container service",
            "docker",
            "lightsail",
            "batch",
            "auto scaling",
            "autoscaling",
        ],
        ServiceKind::Compute,
    ),
    rule(
        ServiceGroup::Compute,
        &["instance", "server", "virtual machine", "vm"],
        ServiceKind::Compute,
    ),
    // Storage
    rule(
        ServiceGroup::Storage,
        &["s3", "bucket", "object storage", "blob storage", "glacier"],
        ServiceKind::StorageObject,
    ),
    // Database
    rule(
        ServiceGroup::Database,
        &[
            "rds",
            "aurora",
            "relational database",
            "mysql",
            "postgres",
            "mariadb",
            "oracle",
            "sql database",
        ],
        ServiceKind::RelationalDb,
    ),
    rule(
        ServiceGroup::Database,
        &["dynamodb", "documentdb", "document db", "mongodb", "nosql", "cosmos db"],
        ServiceKind::DocumentDb,
    ),
    rule(
        ServiceGroup::Database,
        &["redshift", "snowflake", "bigquery", "data warehouse"],
        ServiceKind::Warehouse,
    ),
    rule(
        ServiceGroup::Database,
        &["opensearch", "elasticsearch"],
        ServiceKind::Search,
    ),
    rule(ServiceGroup::Database, &["database"], ServiceKind::RelationalDb),
    // Networking
    rule(
        ServiceGroup::Networking,
        &["vpc", "virtual private cloud", "subnet"],
        ServiceKind::NetworkIsolation,
    ),
    rule(
        ServiceGroup::Networking,
        &["load balancer", "alb", "elb", "nlb"],
        ServiceKind::LoadBalancer,
    ),
    rule(
        ServiceGroup::Networking,
        &["cloudfront", "cdn", "content delivery"],
        ServiceKind::Cdn,
    ),
    rule(
        ServiceGroup::Networking,
        &["api gateway", "rest api", "graphql"],
        ServiceKind::ApiGateway,
    ),
    rule(
        ServiceGroup::Networking,
        &["route 53", "route53", "dns", "domain name", "hosted zone"],
        ServiceKind::Dns,
    ),
    // Security and identity
    rule(
        ServiceGroup::Security,
        &["iam", "cognito", "identity", "access management", "role", "policy"],
        ServiceKind::Identity,
    ),
    rule(
        ServiceGroup::Security,
        &["security group", "network acl", "nacl"],
        ServiceKind::NetworkIsolation,
    ),
    rule(
        ServiceGroup::Security,
        &["kms", "key management", "hsm"],
        ServiceKind::KeyManagement,
    ),
    rule(
        ServiceGroup::Security,
        &["secrets manager", "secret", "parameter store"],
        ServiceKind::Secrets,
    ),
    rule(
        ServiceGroup::Security,
        &["waf", "web application firewall", "firewall"],
        ServiceKind::EdgeFirewall,
    ),
    rule(
        ServiceGroup::Security,
        &["shield", "ddos"],
        ServiceKind::DdosProtection,
    ),
    rule(
        ServiceGroup::Security,
        &["guardduty", "security hub", "inspector", "macie"],
        ServiceKind::Monitoring,
    ),
    // Management and monitoring
    rule(
        ServiceGroup::Management,
        &[
            "cloudwatch",
            "cloudtrail",
            "monitoring",
            "metrics",
            "cloudwatch logs",
            "log group",
            "access logs",
            "logging",
            "audit",
            "x-ray",
            "tracing",
        ],
        ServiceKind::Monitoring,
    ),
    // Application integration
    rule(
        ServiceGroup::Integration,
        &["sqs", "queue", "sns", "notification", "eventbridge", "event bus", "mq"],
        ServiceKind::Queue,
    ),
    rule(
        ServiceGroup::Integration,
        &["kinesis", "kafka", "msk", "data stream", "event stream", "streaming"],
        ServiceKind::Stream,
    ),
    // Analytics and ML
    rule(
        ServiceGroup::Analytics,
        &["warehouse", "data lake", "athena"],
        ServiceKind::Warehouse,
    ),
    rule(
        ServiceGroup::Analytics,
        &["search", "kendra"],
        ServiceKind::Search,
    ),
];

/// Keywords up to this many characters only match at the start of a word
const WORD_START_MAX_CHARS: usize = 3;

/// Style fragments that mark a shape as coming from a cloud provider stencil
const PROVIDER_STYLE_MARKERS: &[&str] = &["aws", "azure", "gcp"];

/// Classify a shape from its label, falling back to the style string
pub fn classify(label: &str, style: &str) -> ServiceKind {
    let label = label.to_lowercase();

    if let Some(rule) = KEYWORD_RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|keyword| matches_keyword(&label, keyword)))
    {
        return rule.kind;
    }

    let style = style.to_lowercase();
    if PROVIDER_STYLE_MARKERS.iter().any(|marker| style.contains(marker))
        || label.contains("amazon")
    {
        return ServiceKind::CloudService;
    }

    ServiceKind::Unknown
}

/// Substring match. Short keywords must also start a word, so "iam" misses "miami".
fn matches_keyword(label: &str, keyword: &str) -> bool {
    if keyword.chars().count() > WORD_START_MAX_CHARS {
        return label.contains(keyword);
    }
    label.match_indices(keyword).any(|(at, _)| {
        label[..at]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_common_labels() {
        assert_eq!(classify("Amazon S3 Bucket", ""), ServiceKind::StorageObject);
        assert_eq!(classify("EC2 Instance", ""), ServiceKind::Compute);
        assert_eq!(classify("RDS Database", ""), ServiceKind::RelationalDb);
        assert_eq!(classify("Amazon DynamoDB", ""), ServiceKind::DocumentDb);
        assert_eq!(classify("Lambda Function", ""), ServiceKind::FunctionCompute);
        assert_eq!(classify("Amazon API Gateway", ""), ServiceKind::ApiGateway);
        assert_eq!(classify("CloudFront", ""), ServiceKind::Cdn);
        assert_eq!(classify("Route 53", ""), ServiceKind::Dns);
        assert_eq!(classify("IAM Role", ""), ServiceKind::Identity);
        assert_eq!(classify("AWS KMS", ""), ServiceKind::KeyManagement);
        assert_eq!(classify("Secrets Manager", ""), ServiceKind::Secrets);
        assert_eq!(classify("AWS WAF", ""), ServiceKind::EdgeFirewall);
        assert_eq!(classify("AWS Shield", ""), ServiceKind::DdosProtection);
        assert_eq!(classify("Production VPC", ""), ServiceKind::NetworkIsolation);
        assert_eq!(classify("CloudWatch", ""), ServiceKind::Monitoring);
        assert_eq!(classify("Order Queue (SQS)", ""), ServiceKind::Queue);
        assert_eq!(classify("Kinesis Data Streams", ""), ServiceKind::Stream);
        assert_eq!(classify("OpenSearch", ""), ServiceKind::Search);
        assert_eq!(classify("Amazon Redshift", ""), ServiceKind::Warehouse);
    }

    #[test]
    fn test_load_balancer_aliases_agree() {
        let kind = classify("Application Load Balancer", "");
        assert_eq!(kind, ServiceKind::LoadBalancer);
        assert_eq!(classify("ALB", ""), kind);
        assert_eq!(classify("internal nlb", ""), kind);
    }

    #[test]
    fn test_empty_label_is_unknown() {
        assert_eq!(classify("", ""), ServiceKind::Unknown);
        assert_eq!(classify("Customer", "rounded=1;whiteSpace=wrap;"), ServiceKind::Unknown);
    }

    #[test]
    fn test_style_marker_fallback() {
        assert_eq!(
            classify("Billing", "shape=mxgraph.aws4.resourceIcon;resIcon=mxgraph.aws4.cost"),
            ServiceKind::CloudService
        );
        assert_eq!(classify("Amazon Braket", ""), ServiceKind::CloudService);
    }

    #[test]
    fn test_specific_terms_win_over_generic_ones() {
        // "serverless" also contains "server"
        assert_eq!(classify("Serverless backend", ""), ServiceKind::FunctionCompute);
        // the generic "database" rule sits below the product rules
        assert_eq!(classify("DynamoDB database", ""), ServiceKind::DocumentDb);
        assert_eq!(classify("Reporting database", ""), ServiceKind::RelationalDb);
    }

    #[test]
    fn test_short_keywords_need_a_word_start() {
        assert_eq!(classify("Miami Office", ""), ServiceKind::Unknown);
        assert_eq!(classify("Reporting words", ""), ServiceKind::Unknown);
        assert_eq!(classify("web-ec2", ""), ServiceKind::Compute);
        assert_eq!(classify("Worker VMs", ""), ServiceKind::Compute);
        assert_eq!(classify("Order Queue (SQS)", ""), ServiceKind::Queue);
    }

    #[test]
    fn test_embedded_words_do_not_classify() {
        assert_eq!(classify("Downstream API", ""), ServiceKind::Unknown);
        assert_eq!(classify("Blogs Service", ""), ServiceKind::Unknown);
        assert_eq!(classify("Domain Controller", ""), ServiceKind::Unknown);
        assert_eq!(classify("Clickstream streaming", ""), ServiceKind::Stream);
        assert_eq!(classify("CloudWatch Logs", ""), ServiceKind::Monitoring);
        assert_eq!(classify("example.com domain name", ""), ServiceKind::Dns);
    }

    #[test]
    fn test_group_order_is_respected() {
        // compute is evaluated before database
        assert_eq!(classify("RDS Instance", ""), ServiceKind::Compute);
    }

    #[test]
    fn test_rule_groups_are_contiguous_and_ordered() {
        let groups: Vec<ServiceGroup> = KEYWORD_RULES.iter().map(|r| r.group).collect();
        let order = [
            ServiceGroup::Compute,
            ServiceGroup::Storage,
            ServiceGroup::Database,
            ServiceGroup::Networking,
            ServiceGroup::Security,
            ServiceGroup::Management,
            ServiceGroup::Integration,
            ServiceGroup::Analytics,
        ];
        let rank = |g: &ServiceGroup| order.iter().position(|o| o == g).unwrap();
        assert!(groups.windows(2).all(|w| rank(&w[0]) <= rank(&w[1])));
    }

    #[test]
    fn test_keywords_are_lowercase() {
        for rule in KEYWORD_RULES {
            for keyword in rule.keywords {
                assert_eq!(*keyword, keyword.to_lowercase());
            }
        }
    }

    #[test]
    fn test_security_relevant_kinds() {
        assert!(ServiceKind::Identity.is_security_relevant());
        assert!(ServiceKind::Compute.is_security_relevant());
        assert!(ServiceKind::StorageObject.is_security_relevant());
        assert!(!ServiceKind::Monitoring.is_security_relevant());
        assert!(!ServiceKind::Unknown.is_security_relevant());
    }
}
