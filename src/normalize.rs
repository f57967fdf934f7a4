// 🌳 Hierarchy Normalizer - Customer record → uniform display tree
//
// Turns the domain-shaped customer object (accounts, sub-accounts, bank
// accounts, contacts, ...) into `DisplayNode`s with a name, a category, the
// originating JSON fragment and children.
//
// Every field is optional at every level: missing, null or non-array
// collections simply produce no nodes.

use crate::category::Category;
use serde::Serialize;
use serde_json::Value;

pub const FALLBACK_NAME: &str = "Unnamed";
pub const BANK_ACCOUNT_NAME: &str = "Bank Account";
pub const BILLING_NAME: &str = "Billing";
pub const CONTRACT_NAME: &str = "Contract";
pub const CONTACT_NAME: &str = "Contact";
pub const ADDRESS_NAME: &str = "Address";
pub const COMM_NAME: &str = "Channel";

/// Name resolution order for accounts and the root
const NAME_KEYS: [&str; 4] = ["tradingName", "officialName", "mdmAccountId", "mdmCustomerId"];

// ============================================================================
// DISPLAY NODE
// ============================================================================

/// Normalized tree node. `data` borrows the input fragment it was built from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayNode<'a> {
    pub name: String,
    #[serde(rename = "type")]
    pub category: Category,
    pub data: &'a Value,
    pub children: Vec<DisplayNode<'a>>,
}

impl<'a> DisplayNode<'a> {
    pub fn leaf(name: impl Into<String>, category: Category, data: &'a Value) -> Self {
        DisplayNode {
            name: name.into(),
            category,
            data,
            children: Vec::new(),
        }
    }

    /// Total number of nodes in this subtree, including self
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(DisplayNode::count).sum::<usize>()
    }

    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(DisplayNode::depth).max().unwrap_or(0)
    }

    /// Pre-order walk
    pub fn walk(&self, visit: &mut impl FnMut(&DisplayNode<'a>)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}

// ============================================================================
// NORMALIZATION
// ============================================================================

/// Build the display tree for `customer`, tagging the root with `root`.
pub fn normalize(customer: &Value, root: Category) -> DisplayNode<'_> {
    let mut node = DisplayNode::leaf(entity_name(customer), root, customer);

    for account in items(customer, "accounts") {
        node.children.push(normalize(account, declared_type(account, Category::Account)));
    }

    for sub_account in items(customer, "children") {
        node.children
            .push(normalize(sub_account, declared_type(sub_account, Category::SubAccount)));
    }

    for bank in items(customer, "bankAccounts") {
        node.children
            .push(DisplayNode::leaf(BANK_ACCOUNT_NAME, Category::Bank, bank));
    }

    for billing in items(customer, "billingAgreements") {
        node.children
            .push(DisplayNode::leaf(BILLING_NAME, Category::Billing, billing));
    }

    for contract in items(customer, "contracts") {
        let name = text(contract, "contractName").unwrap_or_else(|| CONTRACT_NAME.to_string());
        node.children
            .push(DisplayNode::leaf(name, Category::Contract, contract));
    }

    for contact in items(customer, "contactPersons") {
        node.children.push(contact_node(contact));
    }

    for address in items(customer, "addresses") {
        node.children
            .push(DisplayNode::leaf(address_name(address), Category::Address, address));
    }

    node
}

fn contact_node(contact: &Value) -> DisplayNode<'_> {
    let name = join_present(&[text(contact, "firstName"), text(contact, "lastName")], " ")
        .unwrap_or_else(|| CONTACT_NAME.to_string());

    let mut node = DisplayNode::leaf(name, Category::Contact, contact);
    for channel in items(contact, "commChannels") {
        let name = text(channel, "value").unwrap_or_else(|| COMM_NAME.to_string());
        node.children.push(DisplayNode::leaf(name, Category::Comm, channel));
    }
    node
}

fn address_name(address: &Value) -> String {
    join_present(&[text(address, "city"), text(address, "country")], ", ")
        .unwrap_or_else(|| ADDRESS_NAME.to_string())
}

/// First non-empty of tradingName, officialName, mdmAccountId, mdmCustomerId
pub fn entity_name(value: &Value) -> String {
    NAME_KEYS
        .iter()
        .find_map(|key| text(value, key))
        .unwrap_or_else(|| FALLBACK_NAME.to_string())
}

fn declared_type(value: &Value, default: Category) -> Category {
    match text(value, "type") {
        Some(raw) => Category::from_type_str(&raw),
        None => default,
    }
}

fn items<'a>(value: &'a Value, key: &str) -> std::slice::Iter<'a, Value> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
        .iter()
}

/// Scalar field as display text. Empty strings count as absent.
pub fn text(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn join_present(parts: &[Option<String>], sep: &str) -> Option<String> {
    let present: Vec<&str> = parts.iter().flatten().map(String::as_str).collect();
    if present.is_empty() {
        None
    } else {
        Some(present.join(sep))
    }
}
