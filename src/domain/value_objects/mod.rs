//! Value Objects for Logistics

use chrono::Utc;
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("Invalid postal code: {0}")]
    PostalCode(String),
    #[error("Unknown federative unit: {0}")]
    FederativeUnit(String),
    #[error("Unknown delivery tier: {0}")]
    DeliveryTier(String),
    #[error("Invalid tracking code: {0}")]
    TrackingCode(String),
    #[error("Weight must be greater than 0.1kg and at most 15kg, got {0}")]
    Weight(Decimal),
    #[error("Height must be between 20cm and 100cm, got {0}")]
    Height(Decimal),
    #[error("Declared value cannot be negative, got {0}")]
    DeclaredValue(Decimal),
    #[error("{0} is required")]
    Blank(&'static str),
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("Currency mismatch")]
    CurrencyMismatch,
    #[error("Invalid CPF, expected 000.000.000-00 or 00000000000: {0}")]
    Cpf(String),
    #[error("Invalid phone, expected (11) 99999-9999 or (11) 3333-4444: {0}")]
    Phone(String),
}

/// Money value object
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money { amount: Decimal, currency: String }

impl Money {
    pub fn new(amount: Decimal, currency: &str) -> Self { Self { amount, currency: currency.to_string() } }
    pub fn brl(amount: Decimal) -> Self { Self::new(amount, "BRL") }
    pub fn zero(currency: &str) -> Self { Self::new(Decimal::ZERO, currency) }
    pub fn amount(&self) -> Decimal { self.amount }
    pub fn currency(&self) -> &str { &self.currency }
    pub fn add(&self, other: &Money) -> Result<Money, ValueError> {
        if self.currency != other.currency { return Err(ValueError::CurrencyMismatch); }
        Ok(Money::new(self.amount + other.amount, &self.currency))
    }
    pub fn add_amount(&self, amount: Decimal) -> Money { Money::new(self.amount + amount, &self.currency) }

    /// Rounds to `dp` decimal places, midpoint away from zero.
    pub fn round_half_up(&self, dp: u32) -> Money {
        Money::new(round_half_up(self.amount, dp), &self.currency)
    }

    /// `R$ 132.00`
    pub fn formatted(&self) -> String {
        let symbol = if self.currency == "BRL" { "R$" } else { self.currency.as_str() };
        format!("{} {:.2}", symbol, round_half_up(self.amount, 2))
    }
}

impl Default for Money { fn default() -> Self { Self::zero("BRL") } }

pub(crate) fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Delivery tier chosen by the customer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryTier { Express, Standard, Economy }

impl DeliveryTier {
    pub const ALL: [DeliveryTier; 3] = [Self::Express, Self::Standard, Self::Economy];

    pub fn as_str(&self) -> &'static str {
        match self { Self::Express => "EXPRESS", Self::Standard => "STANDARD", Self::Economy => "ECONOMY" }
    }

    pub fn label(&self) -> &'static str {
        match self { Self::Express => "Express", Self::Standard => "Standard", Self::Economy => "Economy" }
    }

    /// Canonical minimum lead time in days.
    pub fn lead_time_days(&self) -> u32 {
        match self { Self::Express => 1, Self::Standard => 3, Self::Economy => 7 }
    }
}

impl fmt::Display for DeliveryTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for DeliveryTier {
    type Err = ValueError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EXPRESS" => Ok(Self::Express),
            "STANDARD" => Ok(Self::Standard),
            "ECONOMY" => Ok(Self::Economy),
            _ => Err(ValueError::DeliveryTier(s.to_string())),
        }
    }
}

/// Brazilian postal code (CEP), stored as its 8 digits.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PostalCode(String);

impl PostalCode {
    /// Accepts `00000000` or `00000-000`.
    pub fn parse(raw: &str) -> Result<Self, ValueError> {
        let trimmed = raw.trim();
        let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();
        let well_formed = match trimmed.len() {
            8 => digits.len() == 8,
            9 => digits.len() == 8 && trimmed.as_bytes().get(5) == Some(&b'-'),
            _ => false,
        };
        if !well_formed { return Err(ValueError::PostalCode(raw.to_string())); }
        Ok(Self(digits))
    }

    pub fn digits(&self) -> &str { &self.0 }

    /// `00000-000`
    pub fn formatted(&self) -> String {
        let (head, tail) = self.0.split_at(5);
        format!("{}-{}", head, tail)
    }
}

impl fmt::Display for PostalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.formatted()) }
}

impl TryFrom<String> for PostalCode {
    type Error = ValueError;
    fn try_from(value: String) -> Result<Self, Self::Error> { Self::parse(&value) }
}

impl From<PostalCode> for String {
    fn from(value: PostalCode) -> Self { value.formatted() }
}

macro_rules! federative_units {
    ($($code:ident => $name:literal),+ $(,)?) => {
        /// Brazilian federative unit (UF).
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub enum FederativeUnit { $($code),+ }

        impl FederativeUnit {
            pub const ALL: &'static [FederativeUnit] = &[$(Self::$code),+];

            pub fn code(&self) -> &'static str {
                match self { $(Self::$code => stringify!($code)),+ }
            }

            pub fn name(&self) -> &'static str {
                match self { $(Self::$code => $name),+ }
            }
        }

        impl FromStr for FederativeUnit {
            type Err = ValueError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_uppercase().as_str() {
                    $(stringify!($code) => Ok(Self::$code),)+
                    _ => Err(ValueError::FederativeUnit(s.to_string())),
                }
            }
        }
    };
}

federative_units! {
    AC => "Acre", AL => "Alagoas", AP => "Amapá", AM => "Amazonas", BA => "Bahia",
    CE => "Ceará", DF => "Distrito Federal", ES => "Espírito Santo", GO => "Goiás",
    MA => "Maranhão", MT => "Mato Grosso", MS => "Mato Grosso do Sul", MG => "Minas Gerais",
    PA => "Pará", PB => "Paraíba", PR => "Paraná", PE => "Pernambuco", PI => "Piauí",
    RJ => "Rio de Janeiro", RN => "Rio Grande do Norte", RS => "Rio Grande do Sul",
    RO => "Rondônia", RR => "Roraima", SC => "Santa Catarina", SP => "São Paulo",
    SE => "Sergipe", TO => "Tocantins",
}

impl fmt::Display for FederativeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.code()) }
}

impl TryFrom<String> for FederativeUnit {
    type Error = ValueError;
    fn try_from(value: String) -> Result<Self, Self::Error> { value.parse() }
}

impl From<FederativeUnit> for String {
    fn from(value: FederativeUnit) -> Self { value.code().to_string() }
}

pub const NO_NUMBER: &str = "s/n";

/// Street address referenced by an order as origin or destination.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub postal_code: PostalCode,
    pub street: String,
    pub number: String,
    pub complement: Option<String>,
    pub neighborhood: String,
    pub city: String,
    pub state: FederativeUnit,
    pub reference: Option<String>,
}

impl Address {
    pub fn new(
        postal_code: PostalCode, street: impl Into<String>, number: Option<String>,
        neighborhood: impl Into<String>, city: impl Into<String>, state: FederativeUnit,
    ) -> Self {
        let number = number.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()).unwrap_or_else(|| NO_NUMBER.to_string());
        Self {
            postal_code, street: street.into().trim().to_string(), number, complement: None,
            neighborhood: neighborhood.into().trim().to_string(), city: city.into().trim().to_string(),
            state, reference: None,
        }
    }

    pub fn with_complement(mut self, complement: Option<String>) -> Self { self.complement = non_blank(complement); self }
    pub fn with_reference(mut self, reference: Option<String>) -> Self { self.reference = non_blank(reference); self }

    pub fn is_complete(&self) -> bool {
        [&self.street, &self.number, &self.neighborhood, &self.city].iter().all(|s| !s.trim().is_empty())
    }

    /// `street, number, neighborhood, city - UF, 00000-000`, the shape sent to the distance provider.
    pub fn postal_formatted(&self) -> String {
        format!("{}, {}, {}, {} - {}, {}", self.street, self.number, self.neighborhood, self.city, self.state.code(), self.postal_code.formatted())
    }

    pub fn full_description(&self) -> String {
        let mut out = format!("{}, {}", self.street, self.number);
        if let Some(complement) = &self.complement { out.push_str(" - "); out.push_str(complement); }
        out.push_str(&format!(", {}, {} - {}, CEP: {}", self.neighborhood, self.city, self.state.code(), self.postal_code.formatted()));
        out
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Human-facing order identifier, `CE<digits>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TrackingCode(String);

impl TrackingCode {
    pub const MAX_LEN: usize = 20;

    /// `CE` + (epoch millis mod 1,000,000) + zero-padded 3-digit random suffix.
    pub fn generate() -> Self {
        Self::from_parts(Utc::now().timestamp_millis(), rand::thread_rng().gen_range(0..1000))
    }

    fn from_parts(epoch_millis: i64, suffix: u32) -> Self {
        Self(format!("CE{}{:03}", epoch_millis.rem_euclid(1_000_000), suffix % 1000))
    }

    pub fn parse(raw: &str) -> Result<Self, ValueError> {
        let raw = raw.trim();
        let valid = raw.len() <= Self::MAX_LEN
            && raw.strip_prefix("CE").is_some_and(|d| !d.is_empty() && d.chars().all(|c| c.is_ascii_digit()));
        if !valid { return Err(ValueError::TrackingCode(raw.to_string())); }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for TrackingCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl TryFrom<String> for TrackingCode {
    type Error = ValueError;
    fn try_from(value: String) -> Result<Self, Self::Error> { Self::parse(&value) }
}

impl From<TrackingCode> for String {
    fn from(value: TrackingCode) -> Self { value.0 }
}

/// Parcel weight in kg, (0.1, 15.0].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Weight(Decimal);

impl Weight {
    pub fn new(kg: Decimal) -> Result<Self, ValueError> {
        if kg <= Decimal::new(1, 1) || kg > Decimal::new(15, 0) { return Err(ValueError::Weight(kg)); }
        Ok(Self(kg))
    }
    pub fn kg(&self) -> Decimal { self.0 }
}

impl TryFrom<Decimal> for Weight {
    type Error = ValueError;
    fn try_from(value: Decimal) -> Result<Self, Self::Error> { Self::new(value) }
}

impl From<Weight> for Decimal {
    fn from(value: Weight) -> Self { value.0 }
}

/// Parcel height in cm, [20, 100].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Height(Decimal);

impl Height {
    pub fn new(cm: Decimal) -> Result<Self, ValueError> {
        if cm < Decimal::new(20, 0) || cm > Decimal::new(100, 0) { return Err(ValueError::Height(cm)); }
        Ok(Self(cm))
    }
    pub fn cm(&self) -> Decimal { self.0 }
}

impl TryFrom<Decimal> for Height {
    type Error = ValueError;
    fn try_from(value: Decimal) -> Result<Self, Self::Error> { Self::new(value) }
}

impl From<Height> for Decimal {
    fn from(value: Height) -> Self { value.0 }
}

/// Declared value for insurance, never negative.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct DeclaredValue(Decimal);

impl DeclaredValue {
    pub fn new(amount: Decimal) -> Result<Self, ValueError> {
        if amount.is_sign_negative() && !amount.is_zero() { return Err(ValueError::DeclaredValue(amount)); }
        Ok(Self(amount))
    }
    pub fn amount(&self) -> Decimal { self.0 }
}

impl TryFrom<Decimal> for DeclaredValue {
    type Error = ValueError;
    fn try_from(value: Decimal) -> Result<Self, Self::Error> { Self::new(value) }
}

impl From<DeclaredValue> for Decimal {
    fn from(value: DeclaredValue) -> Self { value.0 }
}

static CPF: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{3}\.\d{3}\.\d{3}-\d{2}|\d{11})$").expect("static CPF pattern"));
static PHONE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\(?\d{2}\)?\s?9?\d{4}-?\d{4}$").expect("static phone pattern"));

fn digits_of(raw: &str) -> String { raw.chars().filter(char::is_ascii_digit).collect() }

/// Brazilian individual taxpayer number, stored as its 11 digits.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cpf(String);

impl Cpf {
    pub fn parse(raw: &str) -> Result<Self, ValueError> {
        let raw = raw.trim();
        if !CPF.is_match(raw) { return Err(ValueError::Cpf(raw.to_string())); }
        Ok(Self(digits_of(raw)))
    }

    pub fn digits(&self) -> &str { &self.0 }

    /// `000.000.000-00`
    pub fn formatted(&self) -> String {
        format!("{}.{}.{}-{}", &self.0[..3], &self.0[3..6], &self.0[6..9], &self.0[9..])
    }
}

impl TryFrom<String> for Cpf {
    type Error = ValueError;
    fn try_from(value: String) -> Result<Self, Self::Error> { Self::parse(&value) }
}

impl From<Cpf> for String {
    fn from(value: Cpf) -> Self { value.0 }
}

/// Brazilian phone number with area code: 11 digits for mobiles, 10 for landlines.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Phone(String);

impl Phone {
    pub fn parse(raw: &str) -> Result<Self, ValueError> {
        let raw = raw.trim();
        if !PHONE.is_match(raw) { return Err(ValueError::Phone(raw.to_string())); }
        Ok(Self(digits_of(raw)))
    }

    pub fn digits(&self) -> &str { &self.0 }
    pub fn is_mobile(&self) -> bool { self.0.len() == 11 }

    /// `(11) 99999-9999` or `(11) 3333-4444`.
    pub fn formatted(&self) -> String {
        let split = self.0.len() - 4;
        format!("({}) {}-{}", &self.0[..2], &self.0[2..split], &self.0[split..])
    }
}

impl TryFrom<String> for Phone {
    type Error = ValueError;
    fn try_from(value: String) -> Result<Self, Self::Error> { Self::parse(&value) }
}

impl From<Phone> for String {
    fn from(value: Phone) -> Self { value.0 }
}

/// Customer an order is placed for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRef {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<Phone>,
    #[serde(default)]
    pub cpf: Option<Cpf>,
}

impl CustomerRef {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Result<Self, ValueError> {
        let (name, email) = (name.into().trim().to_string(), email.into().trim().to_lowercase());
        if name.is_empty() { return Err(ValueError::Blank("customer name")); }
        if email.is_empty() { return Err(ValueError::Blank("customer email")); }
        if name.chars().count() > 150 { return Err(ValueError::TooLong { field: "customer name", max: 150 }); }
        Ok(Self { name, email, phone: None, cpf: None })
    }

    /// Attaches phone and CPF. Blank values count as absent.
    pub fn with_contact(mut self, phone: Option<&str>, cpf: Option<&str>) -> Result<Self, ValueError> {
        self.phone = phone.map(str::trim).filter(|p| !p.is_empty()).map(Phone::parse).transpose()?;
        self.cpf = cpf.map(str::trim).filter(|c| !c.is_empty()).map(Cpf::parse).transpose()?;
        Ok(self)
    }

    /// Name, email and CPF are all on file.
    pub fn is_complete(&self) -> bool { self.cpf.is_some() && !self.name.is_empty() && !self.email.is_empty() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sp_address() -> Address {
        Address::new(PostalCode::parse("13801-005").unwrap(), "Rua Ariovaldo Silveira Franco", Some("567".into()), "Jardim 31 de Março", "Mogi Mirim", FederativeUnit::SP)
    }

    #[test]
    fn test_postal_code_formats() {
        assert_eq!(PostalCode::parse("13801005").unwrap().formatted(), "13801-005");
        assert_eq!(PostalCode::parse(" 13801-005 ").unwrap().digits(), "13801005");
        assert!(PostalCode::parse("1380-1005").is_err());
        assert!(PostalCode::parse("1380100").is_err());
        assert!(PostalCode::parse("abcdefgh").is_err());
    }

    #[test]
    fn test_federative_unit_parse() {
        assert_eq!("rj".parse::<FederativeUnit>().unwrap(), FederativeUnit::RJ);
        assert_eq!(FederativeUnit::ALL.len(), 27);
        assert!("XX".parse::<FederativeUnit>().is_err());
    }

    #[test]
    fn test_address_defaults_number_and_formats() {
        let address = Address::new(PostalCode::parse("01001000").unwrap(), "Praça da Sé", None, "Sé", "São Paulo", FederativeUnit::SP);
        assert_eq!(address.number, NO_NUMBER);
        assert!(address.is_complete());
        assert_eq!(address.postal_formatted(), "Praça da Sé, s/n, Sé, São Paulo - SP, 01001-000");
    }

    #[test]
    fn test_address_blank_fields_are_incomplete() {
        let mut address = sp_address();
        address.neighborhood = "  ".into();
        assert!(!address.is_complete());
    }

    #[test]
    fn test_full_description_includes_complement() {
        let address = sp_address().with_complement(Some(" Sala 2 ".into())).with_reference(Some("   ".into()));
        assert_eq!(address.reference, None);
        assert_eq!(address.full_description(), "Rua Ariovaldo Silveira Franco, 567 - Sala 2, Jardim 31 de Março, Mogi Mirim - SP, CEP: 13801-005");
    }

    #[test]
    fn test_tracking_code_layout() {
        assert_eq!(TrackingCode::from_parts(1_718_000_123_456, 7).as_str(), "CE123456007");
        assert_eq!(TrackingCode::from_parts(1_718_000_000_042, 999).as_str(), "CE42999");
    }

    #[test]
    fn test_tracking_codes_in_a_burst_are_mostly_distinct() {
        let codes: Vec<TrackingCode> = (0..200).map(|_| TrackingCode::generate()).collect();
        for code in &codes {
            let digits = code.as_str().strip_prefix("CE").unwrap();
            assert!(digits.len() >= 4 && digits.len() <= 9, "{}", code);
            let millis: u64 = digits[..digits.len() - 3].parse().unwrap();
            assert!(millis < 1_000_000);
        }
        // 200 draws from 1000 suffixes inside one millisecond leave ~181 distinct on average.
        let distinct: std::collections::HashSet<&str> = codes.iter().map(TrackingCode::as_str).collect();
        assert!(distinct.len() > 160, "only {} distinct codes out of 200", distinct.len());
    }

    #[test]
    fn test_cpf_and_phone_formats() {
        let cpf = Cpf::parse("123.123.128-09").unwrap();
        assert_eq!(cpf.digits(), "12312312809");
        assert_eq!(cpf.formatted(), "123.123.128-09");
        assert_eq!(Cpf::parse(" 12312312809 ").unwrap(), cpf);
        assert!(Cpf::parse("123.123.12809").is_err());
        assert!(Cpf::parse("1231231280").is_err());

        let mobile = Phone::parse("(11) 97654-3211").unwrap();
        assert_eq!(mobile.digits(), "11976543211");
        assert!(mobile.is_mobile());
        assert_eq!(Phone::parse("11976543211").unwrap().formatted(), "(11) 97654-3211");
        let landline = Phone::parse("1133334444").unwrap();
        assert_eq!(landline.formatted(), "(11) 3333-4444");
        assert!(!landline.is_mobile());
        assert!(Phone::parse("333-4444").is_err());
        assert!(Phone::parse("(11) 8 7654-3211").is_err());
    }

    #[test]
    fn test_customer_contact() {
        let customer = CustomerRef::new(" Jailson Mendes ", "JailsonMMM@gmail.com").unwrap();
        assert!(!customer.is_complete());
        let customer = customer.with_contact(Some("11976543211"), Some("123.123.128-09")).unwrap();
        assert_eq!(customer.email, "jailsonmmm@gmail.com");
        assert!(customer.is_complete());
        assert!(CustomerRef::new("Ana", "ana@example.com").unwrap().with_contact(Some("  "), None).unwrap().phone.is_none());
        assert!(matches!(CustomerRef::new("Ana", "ana@example.com").unwrap().with_contact(None, Some("123")), Err(ValueError::Cpf(_))));
    }

    #[test]
    fn test_tracking_code_shape() {
        let code = TrackingCode::generate();
        assert!(code.as_str().starts_with("CE"));
        assert!(code.as_str().len() <= TrackingCode::MAX_LEN);
        assert!(TrackingCode::parse(code.as_str()).is_ok());
        assert!(TrackingCode::parse("XX123").is_err());
        assert!(TrackingCode::parse("CE").is_err());
        assert!(TrackingCode::parse("CE12a").is_err());
    }

    #[test]
    fn test_measure_bounds() {
        assert!(Weight::new(Decimal::new(1, 1)).is_err());
        assert!(Weight::new(Decimal::new(11, 2)).is_ok());
        assert!(Weight::new(Decimal::new(15, 0)).is_ok());
        assert!(Weight::new(Decimal::new(151, 1)).is_err());
        assert!(Height::new(Decimal::new(20, 0)).is_ok());
        assert!(Height::new(Decimal::new(101, 0)).is_err());
        assert!(DeclaredValue::new(Decimal::ZERO).is_ok());
        assert!(DeclaredValue::new(Decimal::new(-1, 2)).is_err());
    }

    #[test]
    fn test_money_formatting() {
        assert_eq!(Money::brl(Decimal::new(132, 0)).formatted(), "R$ 132.00");
        assert_eq!(Money::brl(Decimal::new(12345, 3)).round_half_up(2).amount(), Decimal::new(1235, 2));
        assert!(Money::brl(Decimal::ONE).add(&Money::zero("USD")).is_err());
    }

    #[test]
    fn test_delivery_tier_parse() {
        assert_eq!("express".parse::<DeliveryTier>().unwrap(), DeliveryTier::Express);
        assert_eq!(DeliveryTier::Economy.lead_time_days(), 7);
        assert!("OVERNIGHT".parse::<DeliveryTier>().is_err());
    }
}
