use serde_json::json;

use crate::{
    domain::{ParamValue, Provenance, Recommendation, SensorReading},
    protocol::{GatewayResponse, PredictionReply},
};

fn rice() -> Recommendation {
    Recommendation {
        crop: "Rice".to_string(),
        fertilizer: "NPK 20-20-20".to_string(),
        amount: "5kg/100m²".to_string(),
    }
}

#[test]
fn param_value_parses_numbers_and_numeric_strings() {
    assert_eq!(ParamValue::from(6.5).as_f64(), Some(6.5));
    assert_eq!(ParamValue::from(" 12.25 ").as_f64(), Some(12.25));
    assert_eq!(ParamValue::from("n/a").as_f64(), None);
    assert_eq!(ParamValue::from("NaN").as_f64(), None);
    assert_eq!(ParamValue::Other(json!(true)).as_f64(), None);
}

#[test]
fn form_values_keep_integral_numbers_short() {
    assert_eq!(ParamValue::from(40.0).to_form_value(), "40");
    assert_eq!(ParamValue::from(6.5).to_form_value(), "6.5");
    assert_eq!(ParamValue::from("Loamy").to_form_value(), "Loamy");
}

#[test]
fn gateway_sensor_tag_counts_as_real() {
    let response: GatewayResponse = serde_json::from_value(json!({
        "success": true,
        "source": "sensor",
        "data": {"N": 40, "P": "20", "K": 150}
    }))
    .expect("decode");

    assert!(response.reported_failure().is_none());
    let reading = response.into_reading();
    assert_eq!(reading.source, Provenance::Real);
    assert_eq!(reading.numeric("P"), Some(20.0));
    assert_eq!(reading.numeric("K"), Some(150.0));
}

#[test]
fn gateway_mock_tag_is_lifted_out_of_data() {
    let response: GatewayResponse = serde_json::from_value(json!({
        "data": {"N": 40, "source": "mock"}
    }))
    .expect("decode");

    let reading = response.into_reading();
    assert!(reading.is_mock());
    assert!(!reading.contains("source"));
}

#[test]
fn gateway_failure_without_message_gets_generic_text() {
    let response: GatewayResponse =
        serde_json::from_value(json!({"success": false})).expect("decode");
    assert_eq!(
        response.reported_failure().as_deref(),
        Some("API reported failure")
    );
}

#[test]
fn sensor_reading_round_trips_flat_json() {
    let reading: SensorReading = serde_json::from_value(json!({
        "N": 40, "pH": "6.5", "Crop Type": "rice", "source": "real"
    }))
    .expect("decode");

    assert_eq!(reading.source, Provenance::Real);
    assert_eq!(reading.numeric("pH"), Some(6.5));
    assert_eq!(
        reading.get("Crop Type"),
        Some(&ParamValue::Text("rice".to_string()))
    );

    let encoded = serde_json::to_value(&reading).expect("encode");
    assert_eq!(encoded["source"], json!("real"));
    assert_eq!(encoded["N"], json!(40.0));
}

#[test]
fn prediction_reply_accepts_both_shapes() {
    let wrapped = json!({"results": {"crop": "Rice", "fertilizer": "NPK 20-20-20", "amount": "5kg/100m²"}});
    let bare = json!({"crop": "Rice", "fertilizer": "NPK 20-20-20", "amount": "5kg/100m²"});

    assert_eq!(
        PredictionReply::from_value(&wrapped).expect("wrapped"),
        PredictionReply::Recommendation(rice())
    );
    assert_eq!(
        PredictionReply::from_value(&bare).expect("bare"),
        PredictionReply::Recommendation(rice())
    );
}

#[test]
fn prediction_reply_reports_service_failure_before_placeholder_results() {
    let reply = json!({
        "success": false,
        "error": "could not convert string to float",
        "results": {"crop": "Error in prediction", "fertilizer": "Unable to determine", "amount": "Error"}
    });

    assert_eq!(
        PredictionReply::from_value(&reply).expect("decode"),
        PredictionReply::Failed("could not convert string to float".to_string())
    );
}

#[test]
fn prediction_reply_rejects_unknown_shapes() {
    assert!(PredictionReply::from_value(&json!({"crop": "Maize"})).is_err());
    assert!(PredictionReply::from_value(&json!({"results": []})).is_err());
    assert!(PredictionReply::from_value(&json!("ok")).is_err());
}

#[test]
fn provenance_decodes_mock_exactly_and_anything_else_as_real() {
    let decode = |tag: &str| serde_json::from_value::<Provenance>(json!(tag)).expect("decode");
    assert_eq!(decode("mock"), Provenance::Mock);
    assert_eq!(decode("real"), Provenance::Real);
    assert_eq!(decode("sensor"), Provenance::Real);
    assert_eq!(decode("Mock"), Provenance::Real);
    assert_eq!(serde_json::to_value(Provenance::Mock).expect("encode"), json!("mock"));
}

#[test]
fn mock_tag_matches_exactly_wherever_it_appears() {
    let top_level: GatewayResponse = serde_json::from_value(json!({
        "source": "Mock",
        "data": {"N": 40}
    }))
    .expect("decode");
    assert!(!top_level.into_reading().is_mock());

    let embedded: GatewayResponse = serde_json::from_value(json!({
        "data": {"N": 40, "source": "Mock"}
    }))
    .expect("decode");
    let reading = embedded.into_reading();
    assert!(!reading.is_mock());
    assert!(!reading.contains("source"));

    let top_level_mock: GatewayResponse = serde_json::from_value(json!({
        "source": "mock",
        "data": {"N": 40}
    }))
    .expect("decode");
    assert!(top_level_mock.into_reading().is_mock());
}
