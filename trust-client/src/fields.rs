//! Recognized request keys
//!
//! Closed sets of the singular field kinds and field groups the remote
//! service accepts. Anything outside these sets is dropped during
//! canonicalization.

use std::fmt;
use std::str::FromStr;

/// Key under which the caller credential travels
pub const CREDENTIAL_KEY: &str = "api_key";

/// Key holding the action object
pub const ACTION_KEY: &str = "action";

/// Boolean query flags copied verbatim when present
pub const FLAG_KEYS: [&str; 3] = ["echo", "connectivity", "signals"];

/// Singular field slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldKind {
    Name,
    Email,
    Phone,
    Address,
    Device,
    Browser,
    Card,
    Order,
    Payment,
    Person,
    PersonalIdentifier,
    Session,
    Locale,
    Custom,
    Page,
}

impl FieldKind {
    /// Identity fields folded into a synthesized `account` group
    pub const IDENTITY: [FieldKind; 4] = [
        FieldKind::Name,
        FieldKind::Email,
        FieldKind::Phone,
        FieldKind::Address,
    ];

    /// Non-identity fields kept at the request root
    pub const ATTRIBUTES: [FieldKind; 11] = [
        FieldKind::Device,
        FieldKind::Browser,
        FieldKind::Card,
        FieldKind::Order,
        FieldKind::Payment,
        FieldKind::Session,
        FieldKind::Person,
        FieldKind::PersonalIdentifier,
        FieldKind::Locale,
        FieldKind::Custom,
        FieldKind::Page,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Name => "name",
            FieldKind::Email => "email",
            FieldKind::Phone => "phone",
            FieldKind::Address => "address",
            FieldKind::Device => "device",
            FieldKind::Browser => "browser",
            FieldKind::Card => "card",
            FieldKind::Order => "order",
            FieldKind::Payment => "payment",
            FieldKind::Person => "person",
            FieldKind::PersonalIdentifier => "personal_identifier",
            FieldKind::Session => "session",
            FieldKind::Locale => "locale",
            FieldKind::Custom => "custom",
            FieldKind::Page => "page",
        }
    }

    /// Whether a bare string for this kind is wrapped as `{raw: ...}`
    pub fn accepts_raw_string(&self) -> bool {
        matches!(
            self,
            FieldKind::Name | FieldKind::Email | FieldKind::Phone | FieldKind::Address
        )
    }
}

impl FromStr for FieldKind {
    type Err = ();

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        FieldKind::IDENTITY
            .iter()
            .chain(FieldKind::ATTRIBUTES.iter())
            .copied()
            .find(|kind| kind.as_str() == key)
            .ok_or(())
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field-group slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GroupKind {
    Account,
    Billing,
    Shipping,
    Sender,
    Recipient,
    Metadata,
}

impl GroupKind {
    pub const ALL: [GroupKind; 6] = [
        GroupKind::Account,
        GroupKind::Billing,
        GroupKind::Shipping,
        GroupKind::Sender,
        GroupKind::Recipient,
        GroupKind::Metadata,
    ];

    /// Groups holding an independent identity (name/email/phone/address...)
    pub const IDENTITY: [GroupKind; 3] = [GroupKind::Account, GroupKind::Billing, GroupKind::Shipping];

    pub fn as_str(&self) -> &'static str {
        match self {
            GroupKind::Account => "account",
            GroupKind::Billing => "billing",
            GroupKind::Shipping => "shipping",
            GroupKind::Sender => "sender",
            GroupKind::Recipient => "recipient",
            GroupKind::Metadata => "metadata",
        }
    }

    pub fn is_identity(&self) -> bool {
        matches!(self, GroupKind::Account | GroupKind::Billing | GroupKind::Shipping)
    }
}

impl FromStr for GroupKind {
    type Err = ();

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        GroupKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == key)
            .ok_or(())
    }
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a top-level input key is understood by the canonicalizer
pub fn is_recognized_key(key: &str) -> bool {
    key == ACTION_KEY
        || FLAG_KEYS.contains(&key)
        || key.parse::<FieldKind>().is_ok()
        || key.parse::<GroupKind>().is_ok()
}
