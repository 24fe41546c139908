use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

/// A market participant. `things` lists the order identifiers the caller
/// associates with the user; the ledger does not maintain it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    pub user_id: String,
    pub salt: String,
    pub hash: String,
    pub first_name: String,
    pub last_name: String,
    pub things: Vec<String>,
    pub address: String,
    pub phone_number: String,
    pub email_address: String,
}

/// A sell offer for an amount of energy over a time window.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Order {
    pub id: String,
    pub kwh_amount: Quantity,
    pub price_kwh: Quantity,
    pub time_start: i64,
    pub duration: i64,
    pub seller_id: String,
    pub sold_bool: bool,
}

impl Order {
    /// `kwhAmount · priceKwh`, if both quantities read as decimals.
    pub fn total_price(&self) -> Option<Decimal> {
        self.kwh_amount
            .decimal()?
            .checked_mul(self.price_kwh.decimal()?)
    }
}

/// An order quantity exactly as the caller wrote it: a JSON string (any
/// text, numeric or not) or a JSON number. It is stored and re-emitted
/// unchanged; [`Quantity::decimal`] gives the numeric reading when there is
/// one. `null` reads as the empty string.
#[derive(Debug, Clone, PartialEq)]
pub enum Quantity {
    Text(String),
    Number(serde_json::Number),
}

impl Quantity {
    pub fn decimal(&self) -> Option<Decimal> {
        match self {
            Quantity::Text(text) => Decimal::from_str(text.trim()).ok(),
            Quantity::Number(number) => Decimal::from_str(&number.to_string())
                .or_else(|_| Decimal::from_scientific(&number.to_string()))
                .ok(),
        }
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Quantity::Text(String::new())
    }
}

impl From<Decimal> for Quantity {
    fn from(value: Decimal) -> Self {
        Quantity::Text(value.to_string())
    }
}

impl From<&str> for Quantity {
    fn from(value: &str) -> Self {
        Quantity::Text(value.to_owned())
    }
}

impl From<u64> for Quantity {
    fn from(value: u64) -> Self {
        Quantity::Number(value.into())
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quantity::Text(text) => f.write_str(text),
            Quantity::Number(number) => write!(f, "{number}"),
        }
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Quantity::Text(text) => serializer.serialize_str(text),
            Quantity::Number(number) => number.serialize(serializer),
        }
    }
}

struct QuantityVisitor;

impl<'de> Visitor<'de> for QuantityVisitor {
    type Value = Quantity;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string or a number")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Quantity, E> {
        Ok(Quantity::Text(value.to_owned()))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<Quantity, E> {
        Ok(Quantity::Text(value))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Quantity, E> {
        Ok(Quantity::Number(value.into()))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Quantity, E> {
        Ok(Quantity::Number(value.into()))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Quantity, E> {
        serde_json::Number::from_f64(value)
            .map(Quantity::Number)
            .ok_or_else(|| E::custom("non-finite quantity"))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Quantity, E> {
        Ok(Quantity::default())
    }

    fn visit_none<E: de::Error>(self) -> Result<Quantity, E> {
        Ok(Quantity::default())
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(QuantityVisitor)
    }
}

/// Settlement of an order between a seller and a buyer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Transaction {
    pub id: String,
    pub order_id: String,
    pub seller_id: String,
    pub buyer_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_order_with_numeric_quantities() {
        let order: Order = serde_json::from_str(
            r#"{"id":"ord","kwhAmount":10,"priceKwh":5,"timeStart":1700000000,"duration":3600,"sellerId":"u1","soldBool":false}"#,
        )
        .unwrap();
        assert_eq!(
            order,
            Order {
                id: "ord".into(),
                kwh_amount: Quantity::from(10u64),
                price_kwh: Quantity::from(5u64),
                time_start: 1_700_000_000,
                duration: 3600,
                seller_id: "u1".into(),
                sold_bool: false,
            }
        );
    }

    #[test]
    fn test_parse_order_with_string_quantities() {
        let order: Order =
            serde_json::from_str(r#"{"id":"o2","kwhAmount":"12.5","priceKwh":"0.21"}"#).unwrap();
        assert_eq!(order.kwh_amount, Quantity::from("12.5"));
        assert_eq!(order.kwh_amount.decimal(), Some(dec!(12.5)));
        assert_eq!(order.price_kwh.decimal(), Some(dec!(0.21)));
        assert_eq!(order.total_price(), Some(dec!(2.625)));
        assert_eq!(order.seller_id, "");
    }

    #[test]
    fn test_non_numeric_quantity_is_kept() {
        let order: Order =
            serde_json::from_str(r#"{"id":"o3","kwhAmount":"ten","priceKwh":"5","sellerId":"u1"}"#)
                .unwrap();
        assert_eq!(order.id, "o3");
        assert_eq!(order.kwh_amount, Quantity::from("ten"));
        assert_eq!(order.kwh_amount.decimal(), None);
        assert_eq!(order.total_price(), None);
    }

    #[test]
    fn test_quantities_serialize_as_received() {
        let input = r#"{"id":"o4","kwhAmount":10,"priceKwh":"0.25","timeStart":0,"duration":0,"sellerId":"u1","soldBool":false}"#;
        let order: Order = serde_json::from_str(input).unwrap();
        assert_eq!(serde_json::to_string(&order).unwrap(), input);
    }

    #[test]
    fn test_null_quantity_is_empty() {
        let order: Order = serde_json::from_str(r#"{"kwhAmount":null}"#).unwrap();
        assert_eq!(order.kwh_amount, Quantity::default());
    }

    #[test]
    fn test_parse_order_with_non_scalar_amount() {
        let result = serde_json::from_str::<Order>(r#"{"kwhAmount":{"value":3}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_user_missing_fields_default() {
        let user: User =
            serde_json::from_str(r#"{"userId":"alice","things":["ord1","ord2"]}"#).unwrap();
        assert_eq!(user.user_id, "alice");
        assert_eq!(user.things, vec!["ord1", "ord2"]);
        assert_eq!(user.email_address, "");
    }

    #[test]
    fn test_parse_user_rejects_non_object() {
        assert!(serde_json::from_str::<User>("\"alice\"").is_err());
        assert!(serde_json::from_str::<User>("not json").is_err());
    }

    #[test]
    fn test_transaction_field_names() {
        let tx = Transaction {
            id: "tx1".into(),
            order_id: "ord".into(),
            seller_id: "u1".into(),
            buyer_id: "u2".into(),
        };
        assert_eq!(
            serde_json::to_string(&tx).unwrap(),
            r#"{"id":"tx1","orderId":"ord","sellerId":"u1","buyerId":"u2"}"#
        );
    }
}
