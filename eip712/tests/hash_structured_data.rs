use std::fs;
use std::path::Path;

use eip712::{
    hash_structured_data, EncodingError, Eip712Error, FieldDef, SchemaError, TypedData,
    EIP712_DOMAIN_TYPE,
};
use rstest::rstest;
use serde_json::json;

const FIXTURES_DIR: &str = "tests/fixtures";

const MAIL: &str = "mail.json";
const MAIL_WALLETS: &str = "mail_wallets.json";
const MAIL_WITH_GROUP: &str = "mail_with_group.json";

fn load_typed_data(file_name: &str) -> TypedData {
    let path = Path::new(FIXTURES_DIR).join(file_name);
    let raw = fs::read_to_string(&path).expect("error opening the fixture");
    serde_json::from_str(&raw).expect("error parsing the fixture")
}

#[rstest]
#[case(
    MAIL,
    "Mail",
    "Mail(Person from,Person to,string contents)Person(string name,address wallet)"
)]
#[case(
    MAIL_WALLETS,
    "Mail",
    "Mail(Person from,Person[] to,string contents)Person(string name,address[] wallets)"
)]
#[case(
    MAIL_WITH_GROUP,
    "Mail",
    "Mail(Person from,Group to,string contents)Group(string name,Person[] members)Person(string name,address[] wallets)"
)]
fn encodes_canonical_type_strings(
    #[case] fixture: &str,
    #[case] type_name: &str,
    #[case] expected: &str,
) {
    let typed_data = load_typed_data(fixture);
    assert_eq!(typed_data.encode_type(type_name).unwrap(), expected);
}

#[rstest]
#[case(MAIL)]
#[case(MAIL_WALLETS)]
fn builds_the_known_domain_separator(#[case] fixture: &str) {
    let typed_data = load_typed_data(fixture);
    assert_eq!(
        typed_data.domain_separator().unwrap().to_string(),
        "0xf2cee375fa42b42143804025fc449deafd50cc031ca257e0b194a650a912090f"
    );
}

#[rstest]
#[case(
    MAIL,
    "0xc52c0ee5d84264471806290a3f2c4cecfc5490626bf912d01f240d7a274b371e"
)]
#[case(
    MAIL_WALLETS,
    "0xeb4221181ff3f1a83ea7313993ca9218496e424604ba9492bb4052c03d5c3df8"
)]
fn hashes_known_message_structs(#[case] fixture: &str, #[case] expected: &str) {
    let typed_data = load_typed_data(fixture);
    assert_eq!(
        typed_data.message_struct_hash().unwrap().to_string(),
        expected
    );
}

#[rstest]
#[case(
    MAIL,
    "0xbe609aee343fb3c4b28e1df9e632fca64fcfaede20f02e86244efddf30957bd2"
)]
#[case(
    MAIL_WALLETS,
    "0xa85c2e2b118698e88db68a8105b794a8cc7cec074e89ef991cb4f5f533819cc2"
)]
fn hashes_known_signing_vectors(#[case] fixture: &str, #[case] expected: &str) {
    let typed_data = load_typed_data(fixture);
    assert_eq!(
        hash_structured_data(&typed_data).unwrap().to_string(),
        expected
    );
}

#[test]
fn repeated_hashing_is_deterministic() {
    let typed_data = load_typed_data(MAIL_WALLETS);
    assert_eq!(
        hash_structured_data(&typed_data).unwrap(),
        hash_structured_data(&typed_data).unwrap()
    );
}

#[test]
fn serde_roundtrip_preserves_the_digest() {
    let typed_data = load_typed_data(MAIL_WALLETS);
    let reparsed: TypedData =
        serde_json::from_str(&serde_json::to_string(&typed_data).unwrap()).unwrap();
    assert_eq!(
        hash_structured_data(&typed_data).unwrap(),
        hash_structured_data(&reparsed).unwrap()
    );
}

// The same message content addressed through a nested Group struct hashes
// differently from the directly-addressed Person[] form: the digest is
// sensitive to schema topology, not just to leaf values.
#[test]
fn schema_topology_changes_the_digest() {
    let direct = load_typed_data(MAIL_WALLETS);
    let grouped = load_typed_data(MAIL_WITH_GROUP);
    assert_ne!(
        hash_structured_data(&direct).unwrap(),
        hash_structured_data(&grouped).unwrap()
    );
}

#[test]
fn leaf_values_are_load_bearing() {
    let typed_data = load_typed_data(MAIL);
    let mut changed = typed_data.clone();
    changed.message["contents"] = json!("Hello, Alice!");

    assert_ne!(
        hash_structured_data(&typed_data).unwrap(),
        hash_structured_data(&changed).unwrap()
    );
}

#[test]
fn field_order_is_load_bearing() {
    let typed_data = load_typed_data(MAIL);
    let mut reordered = typed_data.clone();
    reordered.types.insert(
        "Mail",
        vec![
            FieldDef::new("contents", "string"),
            FieldDef::new("from", "Person"),
            FieldDef::new("to", "Person"),
        ],
    );

    assert_ne!(
        hash_structured_data(&typed_data).unwrap(),
        hash_structured_data(&reordered).unwrap()
    );
}

#[test]
fn field_names_are_load_bearing() {
    let typed_data = load_typed_data(MAIL);
    let mut renamed = typed_data.clone();
    renamed.types.insert(
        "Mail",
        vec![
            FieldDef::new("from", "Person"),
            FieldDef::new("to", "Person"),
            FieldDef::new("body", "string"),
        ],
    );
    let contents = renamed.message["contents"].take();
    renamed.message["body"] = contents;

    assert_ne!(
        hash_structured_data(&typed_data).unwrap(),
        hash_structured_data(&renamed).unwrap()
    );
}

#[test]
fn type_names_are_load_bearing() {
    let typed_data = load_typed_data(MAIL);
    let mut renamed = typed_data.clone();
    let fields = typed_data.types.fields("Mail").unwrap().to_vec();
    renamed.types.insert("Email", fields);
    renamed.primary_type = "Email".to_owned();

    assert_ne!(
        hash_structured_data(&typed_data).unwrap(),
        hash_structured_data(&renamed).unwrap()
    );
}

#[rstest]
#[case(json!(2))]
#[case(json!("0x2"))]
fn chain_id_isolates_domains(#[case] chain_id: serde_json::Value) {
    let typed_data = load_typed_data(MAIL);
    let mut forked = typed_data.clone();
    forked.domain["chainId"] = chain_id;

    assert_ne!(
        hash_structured_data(&typed_data).unwrap(),
        hash_structured_data(&forked).unwrap()
    );
}

#[test]
fn verifying_contract_isolates_domains() {
    let typed_data = load_typed_data(MAIL);
    let mut moved = typed_data.clone();
    moved.domain["verifyingContract"] = json!("0xb0b0B0b0b0B0B0b0b0b0B0b0B0B0b0b0b0B0B0B0");

    assert_ne!(
        hash_structured_data(&typed_data).unwrap(),
        hash_structured_data(&moved).unwrap()
    );
}

// An array with exactly one element still hashes the concatenated word
// sequence, so it can never collide with the scalar form of that element.
#[test]
fn single_element_arrays_differ_from_scalars() {
    let scalar: TypedData = serde_json::from_value(json!({
        "types": {
            "EIP712Domain": [{"name": "name", "type": "string"}],
            "Holder": [{"name": "wallet", "type": "address"}]
        },
        "primaryType": "Holder",
        "domain": {"name": "Holdings"},
        "message": {"wallet": "0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826"}
    }))
    .unwrap();
    let array: TypedData = serde_json::from_value(json!({
        "types": {
            "EIP712Domain": [{"name": "name", "type": "string"}],
            "Holder": [{"name": "wallet", "type": "address[]"}]
        },
        "primaryType": "Holder",
        "domain": {"name": "Holdings"},
        "message": {"wallet": ["0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826"]}
    }))
    .unwrap();

    assert_ne!(
        hash_structured_data(&scalar).unwrap(),
        hash_structured_data(&array).unwrap()
    );
}

#[test]
fn short_addresses_fail_encoding() {
    let mut typed_data = load_typed_data(MAIL);
    typed_data.message["from"]["wallet"] = json!("0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD8");

    assert!(matches!(
        hash_structured_data(&typed_data),
        Err(Eip712Error::Encoding(EncodingError::InvalidAddress { .. }))
    ));
}

#[test]
fn undeclared_type_references_fail_schema_validation() {
    let mut typed_data = load_typed_data(MAIL);
    typed_data.types.insert(
        "Mail",
        vec![
            FieldDef::new("from", "Person"),
            FieldDef::new("to", "Committee"),
            FieldDef::new("contents", "string"),
        ],
    );

    assert!(matches!(
        hash_structured_data(&typed_data),
        Err(Eip712Error::Schema(SchemaError::UnknownType(name))) if name == "Committee"
    ));
}

#[test]
fn missing_message_fields_fail_encoding() {
    let mut typed_data = load_typed_data(MAIL);
    typed_data
        .message
        .as_object_mut()
        .unwrap()
        .remove("contents");

    assert!(matches!(
        hash_structured_data(&typed_data),
        Err(Eip712Error::Encoding(EncodingError::MissingField(path))) if path == "Mail.contents"
    ));
}

#[test]
fn undeclared_primary_types_fail_schema_validation() {
    let mut typed_data = load_typed_data(MAIL);
    typed_data.primary_type = "Postcard".to_owned();

    assert!(matches!(
        hash_structured_data(&typed_data),
        Err(Eip712Error::Schema(SchemaError::UnknownType(name))) if name == "Postcard"
    ));
}

#[test]
fn unrecognized_domain_fields_fail_closed() {
    let mut typed_data = load_typed_data(MAIL);
    typed_data.types.insert(
        EIP712_DOMAIN_TYPE,
        vec![
            FieldDef::new("name", "string"),
            FieldDef::new("phone", "string"),
        ],
    );
    typed_data.domain = json!({"name": "Ether Mail", "phone": "555-0100"});

    assert!(matches!(
        hash_structured_data(&typed_data),
        Err(Eip712Error::Schema(SchemaError::UnrecognizedDomainField(name))) if name == "phone"
    ));
}

#[test]
fn empty_arrays_are_encodable() {
    let mut typed_data = load_typed_data(MAIL_WALLETS);
    typed_data.message["to"] = json!([]);

    let emptied = hash_structured_data(&typed_data).unwrap();
    assert_ne!(
        emptied,
        hash_structured_data(&load_typed_data(MAIL_WALLETS)).unwrap()
    );
}
