// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Payment Data Model
//!
//! The [`Payment`] aggregate and its nested value objects. These types are
//! used both as the JSON request/response bodies of the REST API and as the
//! in-memory form of the stored rows.
//!
//! Nested value objects ([`BeneficiaryParty`], [`ChargesInformation`], ...)
//! have no identity of their own: they are written, read, replaced and
//! deleted together with the owning payment.
//!
//! Every field except [`Payment::id`] defaults to its empty value when it is
//! missing from a request body or given as `null`. Scalar attribute values are opaque strings;
//! no format validation is applied to amounts, currencies or dates.

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Decode `null` as the field's empty value, the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

// =============================================================================
// Aggregate Root
// =============================================================================

/// A payment record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Payment {
    /// Unique payment identifier. Immutable after creation.
    pub id: Uuid,
    /// Free-text resource type discriminator (usually `"Payment"`).
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    /// Record version. Stored as given, never checked or incremented.
    #[serde(default, deserialize_with = "null_as_default")]
    pub version: i64,
    /// Owning organisation. Not validated against anything locally.
    #[serde(default, deserialize_with = "null_as_default")]
    pub organisation_id: Uuid,
    #[serde(default, deserialize_with = "null_as_default")]
    pub attributes: Attributes,
}

impl Payment {
    /// An otherwise empty payment with the given identifier.
    pub fn with_id(id: Uuid) -> Self {
        Self {
            id,
            kind: String::new(),
            version: 0,
            organisation_id: Uuid::nil(),
            attributes: Attributes::default(),
        }
    }
}

// =============================================================================
// Attributes
// =============================================================================

/// Payment details.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(default)]
pub struct Attributes {
    #[serde(deserialize_with = "null_as_default")]
    pub amount: String,
    #[serde(deserialize_with = "null_as_default")]
    pub beneficiary_party: BeneficiaryParty,
    #[serde(deserialize_with = "null_as_default")]
    pub charges_information: ChargesInformation,
    #[serde(deserialize_with = "null_as_default")]
    pub currency: String,
    #[serde(deserialize_with = "null_as_default")]
    pub debtor_party: DebtorParty,
    #[serde(deserialize_with = "null_as_default")]
    pub end_to_end_reference: String,
    #[serde(deserialize_with = "null_as_default")]
    pub fx: Fx,
    #[serde(deserialize_with = "null_as_default")]
    pub numeric_reference: String,
    /// Scheme-level payment identifier (distinct from [`Payment::id`]).
    #[serde(deserialize_with = "null_as_default")]
    pub payment_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub payment_purpose: String,
    #[serde(deserialize_with = "null_as_default")]
    pub payment_scheme: String,
    #[serde(deserialize_with = "null_as_default")]
    pub payment_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub processing_date: String,
    #[serde(deserialize_with = "null_as_default")]
    pub reference: String,
    #[serde(deserialize_with = "null_as_default")]
    pub scheme_payment_sub_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub scheme_payment_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub sponsor_party: SponsorParty,
}

// =============================================================================
// Parties
// =============================================================================

/// The account receiving the funds.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(default)]
pub struct BeneficiaryParty {
    #[serde(deserialize_with = "null_as_default")]
    pub account_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub account_number: String,
    /// Account number scheme, e.g. `BBAN` or `IBAN`.
    #[serde(deserialize_with = "null_as_default")]
    pub account_number_code: String,
    #[serde(deserialize_with = "null_as_default")]
    pub account_type: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub address: String,
    #[serde(deserialize_with = "null_as_default")]
    pub bank_id: String,
    /// Bank identifier scheme, e.g. `GBDSC`.
    #[serde(deserialize_with = "null_as_default")]
    pub bank_id_code: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
}

/// The account the funds are taken from.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(default)]
pub struct DebtorParty {
    #[serde(deserialize_with = "null_as_default")]
    pub account_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub account_number: String,
    #[serde(deserialize_with = "null_as_default")]
    pub account_number_code: String,
    #[serde(deserialize_with = "null_as_default")]
    pub address: String,
    #[serde(deserialize_with = "null_as_default")]
    pub bank_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub bank_id_code: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
}

/// The sponsoring bank account.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(default)]
pub struct SponsorParty {
    #[serde(deserialize_with = "null_as_default")]
    pub account_number: String,
    #[serde(deserialize_with = "null_as_default")]
    pub bank_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub bank_id_code: String,
}

// =============================================================================
// Charges & FX
// =============================================================================

/// Who pays which charges.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(default)]
pub struct ChargesInformation {
    /// Charge bearer, e.g. `SHAR`.
    #[serde(deserialize_with = "null_as_default")]
    pub bearer_code: String,
    /// Charges levied on the sender, in the order given.
    #[serde(deserialize_with = "null_as_default")]
    pub sender_charges: Vec<Charge>,
    #[serde(deserialize_with = "null_as_default")]
    pub receiver_charges_amount: String,
    #[serde(deserialize_with = "null_as_default")]
    pub receiver_charges_currency: String,
}

/// A single charge.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(default)]
pub struct Charge {
    #[serde(deserialize_with = "null_as_default")]
    pub amount: String,
    #[serde(deserialize_with = "null_as_default")]
    pub currency: String,
}

/// Foreign exchange details.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(default)]
pub struct Fx {
    #[serde(deserialize_with = "null_as_default")]
    pub contract_reference: String,
    #[serde(deserialize_with = "null_as_default")]
    pub exchange_rate: String,
    #[serde(deserialize_with = "null_as_default")]
    pub original_amount: String,
    #[serde(deserialize_with = "null_as_default")]
    pub original_currency: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_fields_default_to_empty_values() {
        let id = Uuid::new_v4();
        let payment: Payment = serde_json::from_value(json!({ "id": id })).unwrap();

        assert_eq!(payment, Payment::with_id(id));
    }

    #[test]
    fn null_fields_decode_as_empty_values() {
        let id = Uuid::new_v4();
        let value = json!({
            "id": id,
            "type": null,
            "version": null,
            "organisation_id": null,
            "attributes": {
                "amount": "100.21",
                "beneficiary_party": null,
                "charges_information": {
                    "bearer_code": "SHAR",
                    "sender_charges": null
                },
                "fx": null
            }
        });

        let payment: Payment = serde_json::from_value(value).unwrap();

        let mut expected = Payment::with_id(id);
        expected.attributes.amount = "100.21".into();
        expected.attributes.charges_information.bearer_code = "SHAR".into();
        assert_eq!(payment, expected);
    }

    #[test]
    fn null_attributes_decode_as_empty_attributes() {
        let id = Uuid::new_v4();
        let payment: Payment =
            serde_json::from_value(json!({ "id": id, "attributes": null })).unwrap();

        assert_eq!(payment, Payment::with_id(id));
    }

    #[test]
    fn null_id_is_rejected() {
        let result = serde_json::from_value::<Payment>(json!({ "id": null }));
        assert!(result.is_err());
    }

    #[test]
    fn id_is_required() {
        let result = serde_json::from_value::<Payment>(json!({ "type": "Payment" }));
        assert!(result.is_err());
    }

    #[test]
    fn non_object_body_is_rejected() {
        let result = serde_json::from_str::<Payment>(r#""{ random: 'random' }""#);
        assert!(result.is_err());
    }

    #[test]
    fn type_field_uses_wire_name() {
        let mut payment = Payment::with_id(Uuid::new_v4());
        payment.kind = "Payment".into();

        let value = serde_json::to_value(&payment).unwrap();
        assert_eq!(value["type"], "Payment");
        assert!(value.get("kind").is_none());
    }

    #[test]
    fn sender_charges_keep_their_order() {
        let value = json!({
            "id": Uuid::new_v4(),
            "attributes": {
                "charges_information": {
                    "bearer_code": "SHAR",
                    "sender_charges": [
                        { "amount": "5.00", "currency": "GBP" },
                        { "amount": "10.00", "currency": "USD" }
                    ]
                }
            }
        });

        let payment: Payment = serde_json::from_value(value).unwrap();
        let charges = &payment.attributes.charges_information.sender_charges;
        assert_eq!(charges.len(), 2);
        assert_eq!(charges[0].currency, "GBP");
        assert_eq!(charges[1].currency, "USD");
    }
}
