// 🏷️ Category - Closed classification of diagram nodes
//
// A node's category decides two things and nothing else:
// - which colour bucket its header is painted with
// - which fields of its source record are shown as detail lines
//
// Declared `type` strings from the input are parsed once into this enum;
// anything unrecognised lands in `Other` (the default/location bucket).

use serde::{Deserialize, Serialize};

// ============================================================================
// CATEGORY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    /// Root of the hierarchy (global customer group)
    Global,
    SoldTo,
    Pickup,
    CountryCustomer,
    Account,
    SubAccount,
    Bank,
    Billing,
    Contract,
    Contact,
    /// Communication channel of a contact (phone, email, ...)
    Comm,
    Address,
    /// Unrecognised or undeclared type
    Other,
}

impl Category {
    pub const ALL: [Category; 13] = [
        Category::Global,
        Category::SoldTo,
        Category::Pickup,
        Category::CountryCustomer,
        Category::Account,
        Category::SubAccount,
        Category::Bank,
        Category::Billing,
        Category::Contract,
        Category::Contact,
        Category::Comm,
        Category::Address,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Global => "GLOBAL",
            Category::SoldTo => "SOLD_TO",
            Category::Pickup => "PICKUP",
            Category::CountryCustomer => "COUNTRY_CUSTOMER",
            Category::Account => "ACCOUNT",
            Category::SubAccount => "SUB_ACCOUNT",
            Category::Bank => "BANK",
            Category::Billing => "BILLING",
            Category::Contract => "CONTRACT",
            Category::Contact => "CONTACT",
            Category::Comm => "COMM",
            Category::Address => "ADDRESS",
            Category::Other => "OTHER",
        }
    }

    /// Parse a declared type string ("SOLD_TO", "sold-to", "Sold To" ...).
    /// Never fails: unknown strings become `Other`.
    pub fn from_type_str(raw: &str) -> Category {
        let normalized: String = raw
            .trim()
            .chars()
            .map(|c| match c {
                '-' | ' ' => '_',
                c => c.to_ascii_uppercase(),
            })
            .collect();

        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == normalized)
            .unwrap_or(Category::Other)
    }

    pub fn bucket(&self) -> Bucket {
        match self {
            Category::Global => Bucket::Global,
            Category::SoldTo
            | Category::Pickup
            | Category::CountryCustomer
            | Category::Account
            | Category::SubAccount => Bucket::Commercial,
            Category::Bank | Category::Billing | Category::Contract => Bucket::Financial,
            Category::Contact | Category::Comm => Bucket::Personnel,
            Category::Address | Category::Other => Bucket::Location,
        }
    }

    /// Which record fields are shown in the node body, in display order
    pub fn detail_fields(&self) -> &'static [DetailField] {
        match self {
            Category::Global => &[
                DetailField {
                    label: "ID",
                    keys: &["globalGroupCode", "mdmCustomerId"],
                    masked: false,
                },
                DetailField {
                    label: "Scope",
                    keys: &["scope", "country"],
                    masked: false,
                },
            ],
            Category::Bank => &[DetailField {
                label: "IBAN",
                keys: &["iban", "accountNumber"],
                masked: true,
            }],
            Category::Address => &[
                DetailField {
                    label: "City",
                    keys: &["city"],
                    masked: false,
                },
                DetailField {
                    label: "Country",
                    keys: &["country"],
                    masked: false,
                },
            ],
            Category::Contact => &[DetailField {
                label: "Title",
                keys: &["jobTitle"],
                masked: false,
            }],
            _ => &[DetailField {
                label: "ID",
                keys: &["mdmAccountId", "mdmCustomerId", "accountId"],
                masked: false,
            }],
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// COLOUR BUCKETS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Global,
    Commercial,
    Financial,
    Personnel,
    Location,
}

/// Colours of a node header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub header_fill: Rgb,
    pub header_text: Rgb,
}

impl Bucket {
    pub fn palette(&self) -> Palette {
        match self {
            Bucket::Global => Palette {
                header_fill: Rgb(0xFF, 0xCC, 0x00),
                header_text: Rgb::BLACK,
            },
            Bucket::Commercial => Palette {
                header_fill: Rgb(0xD4, 0x05, 0x11),
                header_text: Rgb::WHITE,
            },
            Bucket::Financial => Palette {
                header_fill: Rgb(0x2E, 0x7D, 0x32),
                header_text: Rgb::WHITE,
            },
            Bucket::Personnel => Palette {
                header_fill: Rgb(0x15, 0x65, 0xC0),
                header_text: Rgb::WHITE,
            },
            Bucket::Location => Palette {
                header_fill: Rgb(0x61, 0x61, 0x61),
                header_text: Rgb::WHITE,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(0xFF, 0xFF, 0xFF);
    pub const BLACK: Rgb = Rgb(0x00, 0x00, 0x00);
    /// Body fill of every node box
    pub const NEUTRAL: Rgb = Rgb(0xF7, 0xF7, 0xF7);
    /// Border of every node box
    pub const ACCENT: Rgb = Rgb(0xD4, 0x05, 0x11);
    pub const LINK: Rgb = Rgb(0x9E, 0x9E, 0x9E);
    pub const DETAIL_TEXT: Rgb = Rgb(0x33, 0x33, 0x33);

    pub fn hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

// ============================================================================
// DETAIL FIELDS
// ============================================================================

/// One labelled detail line; the first present key wins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailField {
    pub label: &'static str,
    pub keys: &'static [&'static str],
    /// Show only the edges of the value (IBAN-style)
    pub masked: bool,
}
