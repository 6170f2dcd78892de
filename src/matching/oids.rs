//! Well-known matching-rule and syntax OIDs (RFC 4517, RFC 4530, and
//! the OpenLDAP CSN extension), used to pre-populate the default
//! registries and by tests that exercise specific comparators.

pub const MATCH_CASE_IGNORE: &str = "2.5.13.2";
pub const MATCH_CASE_IGNORE_ORDERING: &str = "2.5.13.3";
pub const MATCH_CASE_EXACT: &str = "2.5.13.5";
pub const MATCH_INTEGER: &str = "2.5.13.14";
pub const MATCH_INTEGER_ORDERING: &str = "2.5.13.15";
pub const MATCH_TELEPHONE_NUMBER: &str = "2.5.13.20";
pub const MATCH_GENERALIZED_TIME: &str = "2.5.13.27";
pub const MATCH_GENERALIZED_TIME_ORDERING: &str = "2.5.13.28";
pub const MATCH_OID_FIRST_COMPONENT: &str = "2.5.13.30";
pub const MATCH_WORD: &str = "2.5.13.32";
pub const MATCH_DISTINGUISHED_NAME: &str = "2.5.13.1";
pub const MATCH_OCTET_STRING: &str = "2.5.13.17";
pub const MATCH_UUID: &str = "1.3.6.1.1.16.2";
pub const MATCH_UUID_ORDERING: &str = "1.3.6.1.1.16.3";
pub const MATCH_CSN: &str = "1.3.6.1.4.1.4203.666.11.2.2";
pub const MATCH_CSN_ORDERING: &str = "1.3.6.1.4.1.4203.666.11.2.4";

pub const SYNTAX_BOOLEAN: &str = "1.3.6.1.4.1.1466.115.121.1.7";
pub const SYNTAX_DIRECTORY_STRING: &str = "1.3.6.1.4.1.1466.115.121.1.15";
pub const SYNTAX_DN: &str = "1.3.6.1.4.1.1466.115.121.1.12";
pub const SYNTAX_GENERALIZED_TIME: &str = "1.3.6.1.4.1.1466.115.121.1.24";
pub const SYNTAX_INTEGER: &str = "1.3.6.1.4.1.1466.115.121.1.27";
pub const SYNTAX_OID: &str = "1.3.6.1.4.1.1466.115.121.1.38";
pub const SYNTAX_TELEPHONE_NUMBER: &str = "1.3.6.1.4.1.1466.115.121.1.50";
pub const SYNTAX_UUID: &str = "1.3.6.1.1.16.1";
pub const SYNTAX_CSN: &str = "1.3.6.1.4.1.4203.666.11.2.1";
pub const SYNTAX_IA5_STRING: &str = "1.3.6.1.4.1.1466.115.121.1.26";
