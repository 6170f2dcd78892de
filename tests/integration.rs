use ldap_core::dn::Dn;
use ldap_core::filter::{self, Filter, ParseOptions};
use ldap_core::matching::{Comparator, Registry, SerializableComparator};
use ldap_core::schema::parser::{descriptions, openldap};
use std::cmp::Ordering;

#[test]
fn dn_parse_and_equality() {
    let a = Dn::parse("CN=Jane Doe+Sn=Doe , DC=Example , DC=com").unwrap();
    let b = Dn::parse("sn=doe + cn=jane doe,dc=example,dc=com").unwrap();
    assert_eq!(a, b);
    assert_eq!(a.to_canonical(), "cn=jane doe+sn=doe,dc=example,dc=com");
    assert_eq!(b.to_canonical(), "cn=jane doe+sn=doe,dc=example,dc=com");
}

#[test]
fn dn_escaping_preserves_comma_escape() {
    let dn = Dn::parse(r"cn=Smith\, John,ou=people,dc=x").unwrap();
    assert_eq!(dn.len(), 3);
    let leaf = dn.leaf().unwrap();
    assert_eq!(leaf.len(), 1);
    assert_eq!(leaf.iter().next().unwrap().value().as_str(), Some("Smith, John"));
    assert!(dn.to_canonical().contains(r"Smith\, John"));
}

#[test]
fn filter_substring() {
    let f = filter::parse("(cn=Ba*b*ra)").unwrap();
    match f {
        Filter::Substring { attr, substrings } => {
            assert_eq!(attr, "cn");
            assert_eq!(substrings.initial.unwrap().as_str(), Some("Ba"));
            assert_eq!(substrings.any.len(), 1);
            assert_eq!(substrings.any[0].as_str(), Some("b"));
            assert_eq!(substrings.final_.unwrap().as_str(), Some("ra"));
        }
        other => panic!("expected Substring filter, got {:?}", other),
    }
}

#[test]
fn filter_and_with_undefined_attribute_collapses_to_undefined() {
    let known = |attr: &str| attr.eq_ignore_ascii_case("cn");
    let opts = ParseOptions {
        relaxed: true,
        attribute_known: Some(&known),
        attribute_is_human_readable: None,
    };
    let f = filter::parse_with("(&(cn=Alice)(xyz=*))", &opts).unwrap();
    assert_eq!(f, Filter::Undefined);
}

#[test]
fn schema_parse_of_attribute_type() {
    let at = descriptions::parse_attribute_type_description(
        "( 2.5.4.3 NAME 'cn' SUP name )",
        false,
    )
    .unwrap();
    assert_eq!(at.envelope.oid(), "2.5.4.3");
    assert_eq!(at.envelope.names(), &["cn".to_string()]);
    assert_eq!(at.superior.as_deref(), Some("name"));
    assert!(!at.single_valued);
}

#[test]
fn openldap_macros_with_forward_reference() {
    let input = "\
objectidentifier OrgOID MyBase:1
objectidentifier MyBase 1.3.6.1.4.1.99999
attributetype ( OrgOID:2 NAME 'foo' SUP name )
";
    let parsed = openldap::parse(input, true).unwrap();
    assert_eq!(parsed.attribute_types.len(), 1);
    assert_eq!(parsed.attribute_types[0].envelope.oid(), "1.3.6.1.4.1.99999.1.2");
}

#[test]
fn comparator_fallback_to_structural() {
    let registry: Registry<dyn Comparator> = Registry::new();
    let cmp = SerializableComparator::new("1.2.3.4", &registry);
    assert_eq!(cmp.compare(Some(b"b"), Some(b"a")), Ordering::Greater);
}

#[test]
fn dn_round_trip_invariant() {
    let inputs = ["cn=Jane Doe,dc=example,dc=com", "uid=jdoe+cn=Jane Doe,ou=people,dc=x"];
    for input in inputs {
        let parsed = Dn::parse(input).unwrap();
        let reparsed = Dn::parse(&parsed.to_canonical()).unwrap();
        assert_eq!(parsed, reparsed);
    }
}

#[test]
fn rdn_multivalued_permutations_are_equal() {
    let a = Dn::parse("cn=Jane+sn=Doe+uid=jdoe,dc=example,dc=com").unwrap();
    let b = Dn::parse("uid=jdoe+cn=Jane+sn=Doe,dc=example,dc=com").unwrap();
    assert_eq!(a, b);
}
