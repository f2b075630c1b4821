//! # Personal Record Behaviour
//!
//! End-to-end checks through the public API only: building a record from
//! raw collaborator input, editing it, exporting it, and rebuilding it from
//! the export.

use docgen_core::{
    Address, AddressInput, AddressRole, ErrorKind, Gender, MaritalStatus, PersonalRecord,
    PersonalRecordDocument, StateId, TaxpayerId,
};
use serde_json::json;

fn maria(addresses: impl Into<AddressInput>) -> PersonalRecord {
    PersonalRecord::builder()
        .full_name("Maria das Dores Silva")
        .taxpayer_id(TaxpayerId::from_formatted("529.982.247-25").unwrap())
        .state_id(StateId::new("8.123.456", "sds", "pe").unwrap())
        .gender("f")
        .marital_status("viuvo")
        .occupation("Pescadora")
        .addresses(addresses)
        .build()
        .unwrap()
}

// ---------------------------------------------------------------------------
// Raw input shapes
// ---------------------------------------------------------------------------

#[test]
fn mapping_input_from_json() {
    let input = AddressInput::try_from(json!({
        "residencial": [{"bairro": "Zona Rural", "logradouro": "Sítio Lagoa"}],
        "trabalho": [],
        "temporario": [{"bairro": "Centro", "logradouro": "Rua Nova"}]
    }))
    .unwrap();
    let record = maria(input);

    let home = record.addresses(AddressRole::Residencial);
    assert_eq!(home.len(), 1);
    assert_eq!(home[0].role(), AddressRole::Residencial);
    assert_eq!(home[0].number(), "S/N");
    assert_eq!(home[0].postal_code(), "55715-000");
    assert!(record.addresses(AddressRole::Trabalho).is_empty());
}

#[test]
fn list_input_from_json_keeps_relative_order() {
    let input = AddressInput::try_from(json!([
        {"tag": "trabalho", "bairro": "Centro", "logradouro": "Rua A"},
        {"tag": "residencial", "bairro": "Centro", "logradouro": "Rua B"},
        {"tag": "ferias", "bairro": "Praia", "logradouro": "Rua C"},
        {"tag": "trabalho", "bairro": "Centro", "logradouro": "Rua D"}
    ]))
    .unwrap();
    let record = maria(input);

    let work: Vec<&str> = record
        .addresses(AddressRole::Trabalho)
        .iter()
        .map(Address::street)
        .collect();
    assert_eq!(work, ["Rua A", "Rua D"]);
    assert_eq!(record.addresses(AddressRole::Residencial)[0].street(), "Rua B");
    assert_eq!(record.address_book().len(), 3);
}

#[test]
fn scalar_address_input_is_rejected() {
    let err = AddressInput::try_from(json!("Rua das Flores")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let err = AddressInput::try_from(json!({"residencial": {"bairro": "Centro"}})).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

// ---------------------------------------------------------------------------
// Normalization and derived fields
// ---------------------------------------------------------------------------

#[test]
fn normalizes_codes_and_derives_nationality() {
    let record = maria(Vec::<Address>::new());
    assert_eq!(record.gender(), Gender::Feminino);
    assert_eq!(record.nationality(), "brasileira");
    assert_eq!(record.marital_status(), MaritalStatus::Viuvo);
    assert_eq!(record.state_id_number(), "8123456 SDS/PE");
    assert_eq!(record.taxpayer_number(), "529.982.247-25");
}

#[test]
fn edit_rederives_nationality_and_revalidates() {
    let record = maria(Vec::<Address>::new());

    let edited = record.edit().gender("m").build().unwrap();
    assert_eq!(edited.nationality(), "brasileiro");
    assert_eq!(edited.full_name(), record.full_name());

    let err = record.edit().marital_status("Casado").build().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MaritalStatus);

    let err = record.edit().gender("X").build().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Gender);
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

#[test]
fn export_json_shape() {
    let record = maria(vec![Address::new(
        AddressRole::Residencial,
        "Centro",
        "Rua das Flores",
    )
    .with_number("123")]);
    let value = serde_json::to_value(record.export()).unwrap();

    assert_eq!(value["nome_completo"], "Maria das Dores Silva");
    assert_eq!(value["genero"], "F");
    assert_eq!(value["estado_civil"], "viuvo");
    assert_eq!(value["nacionalidade"], "brasileira");
    assert_eq!(value["cpf"], json!({"numero": "529.982.247-25"}));
    assert_eq!(value["rg"], json!({"numero": "8123456 SDS/PE"}));
    assert_eq!(value["endereco"]["trabalho"], json!([]));
    assert_eq!(value["endereco"]["residencial"][0]["tag"], "residencial");
    assert_eq!(value["endereco"]["residencial"][0]["numero"], "123");
}

#[test]
fn export_rebuilds_an_equal_record() {
    let record = maria(vec![
        Address::new(AddressRole::Trabalho, "Centro", "Rua Joaquim Correia"),
        Address::new(AddressRole::Residencial, "Zona Rural", "Sítio Lagoa")
            .with_complement("Casa 2"),
    ]);

    let text = serde_json::to_string(&record.export()).unwrap();
    let doc: PersonalRecordDocument = serde_json::from_str(&text).unwrap();
    let rebuilt = PersonalRecord::try_from(doc).unwrap();
    assert_eq!(rebuilt, record);
}

#[test]
fn tampered_export_is_rejected() {
    let mut value = serde_json::to_value(maria(Vec::<Address>::new()).export()).unwrap();
    value["estado_civil"] = json!("noivo");
    assert!(serde_json::from_value::<PersonalRecordDocument>(value).is_err());

    let mut doc = maria(Vec::<Address>::new()).export();
    doc.cpf.numero = "529.982.247-24".to_string();
    let err = PersonalRecord::try_from(doc).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidValue);
    assert_eq!(err.root_kind(), ErrorKind::InvalidValue);
}
