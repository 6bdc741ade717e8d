// crates/ob-conformance-core/src/runtime/field_rules.rs
// ============================================================================
// Module: Field-Requirement Resolver
// Description: Derives the configuration fields a discovery model requires.
// Purpose: Tell the operator UI which inputs to collect before a run.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! The resolver seeds a baseline of client and well-known-endpoint fields,
//! then adds per-endpoint requirements from a static table keyed by
//! `"METHOD PATH"`. Candidates are reduced first-wins by field name: a field
//! that is already present is never replaced, even by a stricter rule.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::LazyLock;

use crate::core::config_field::ConfigField;
use crate::core::discovery::Model;

// ============================================================================
// SECTION: Baseline Fields
// ============================================================================

/// Fields collected at the client level.
fn client_requirements() -> Vec<ConfigField> {
    let mut fields = [
        "signing_private",
        "signing_public",
        "transport_private",
        "transport_public",
        "use_eidas_cert",
        "client_id",
        "x_fapi_financial_id",
        "x_fapi_customer_ip_address",
        "transaction_from_date",
        "transaction_to_date",
    ]
    .into_iter()
    .map(ConfigField::required)
    .collect::<Vec<_>>();
    fields.push(ConfigField::conditional_on("eidas_signing_kid", &["use_eidas_cert"]));
    fields.push(ConfigField::conditional_on("eidas_issuer", &["use_eidas_cert"]));
    fields
}

/// Fields needed to talk to the well-known endpoints.
fn well_known_requirements() -> Vec<ConfigField> {
    [
        "token_endpoint",
        "response_type",
        "token_endpoint_auth_method",
        "request_object_signing_alg",
        "authorization_endpoint",
        "resource_base_url",
        "issuer",
    ]
    .into_iter()
    .map(ConfigField::required)
    .collect()
}

// ============================================================================
// SECTION: Endpoint Table
// ============================================================================

/// Account id field.
const ACCOUNT_IDS: &[&str] = &["resource_ids.account_ids"];
/// Account and statement id fields.
const STATEMENT_IDS: &[&str] = &["resource_ids.account_ids", "resource_ids.statement_ids"];
/// Domestic payment fields.
const DOMESTIC: &[&str] = &["creditor_account", "instructed_amount"];
/// Domestic scheduled payment fields.
const DOMESTIC_SCHEDULED: &[&str] =
    &["creditor_account", "instructed_amount", "requested_execution_date_time"];
/// Domestic standing order fields.
const DOMESTIC_STANDING: &[&str] =
    &["creditor_account", "instructed_amount", "payment_frequency", "first_payment_date_time"];
/// International payment fields.
const INTERNATIONAL: &[&str] =
    &["international_creditor_account", "currency_of_transfer", "instructed_amount"];
/// International scheduled payment fields.
const INTERNATIONAL_SCHEDULED: &[&str] = &[
    "international_creditor_account",
    "currency_of_transfer",
    "instructed_amount",
    "requested_execution_date_time",
];
/// International standing order fields.
const INTERNATIONAL_STANDING: &[&str] = &[
    "international_creditor_account",
    "currency_of_transfer",
    "instructed_amount",
    "payment_frequency",
    "first_payment_date_time",
];
/// Transaction resource id field.
const RESOURCE_IDS: &[&str] = &["resource_ids"];
/// Funds confirmation consent fields.
const CBPII_DEBTOR: &[&str] = &["cbpii_debtor_account"];
/// Funds confirmation fields.
const INSTRUCTED_AMOUNT: &[&str] = &["instructed_amount"];
/// No additional fields.
const NONE: &[&str] = &[];

/// Endpoint requirements keyed by `"METHOD PATH"` in discovery path syntax.
const ENDPOINT_REQUIREMENTS: &[(&str, &[&str])] = &[
    // Account and Transaction API
    ("POST /account-access-consents", NONE),
    ("GET /account-access-consents/{ConsentId}", NONE),
    ("DELETE /account-access-consents/{ConsentId}", NONE),
    ("GET /accounts", NONE),
    ("GET /accounts/{AccountId}", ACCOUNT_IDS),
    ("GET /accounts/{AccountId}/balances", ACCOUNT_IDS),
    ("GET /accounts/{AccountId}/beneficiaries", ACCOUNT_IDS),
    ("GET /accounts/{AccountId}/direct-debits", ACCOUNT_IDS),
    ("GET /accounts/{AccountId}/offers", ACCOUNT_IDS),
    ("GET /accounts/{AccountId}/party", ACCOUNT_IDS),
    ("GET /accounts/{AccountId}/product", ACCOUNT_IDS),
    ("GET /accounts/{AccountId}/scheduled-payments", ACCOUNT_IDS),
    ("GET /accounts/{AccountId}/standing-orders", ACCOUNT_IDS),
    ("GET /accounts/{AccountId}/statements", ACCOUNT_IDS),
    ("GET /accounts/{AccountId}/statements/{StatementId}", STATEMENT_IDS),
    ("GET /accounts/{AccountId}/statements/{StatementId}/file", STATEMENT_IDS),
    ("GET /accounts/{AccountId}/statements/{StatementId}/transactions", STATEMENT_IDS),
    ("GET /accounts/{AccountId}/transactions", RESOURCE_IDS),
    ("GET /balances", NONE),
    ("GET /beneficiaries", NONE),
    ("GET /direct-debits", NONE),
    ("GET /offers", NONE),
    ("GET /party", NONE),
    ("GET /products", NONE),
    ("GET /scheduled-payments", NONE),
    ("GET /standing-orders", NONE),
    ("GET /statements", NONE),
    ("GET /transactions", NONE),
    // Payment Initiation API
    ("POST /domestic-payment-consents", DOMESTIC),
    ("GET /domestic-payment-consents/{ConsentId}", NONE),
    ("GET /domestic-payment-consents/{ConsentId}/funds-confirmation", NONE),
    ("POST /domestic-payments", DOMESTIC),
    ("GET /domestic-payments/{DomesticPaymentId}", NONE),
    ("POST /domestic-scheduled-payment-consents", DOMESTIC_SCHEDULED),
    ("GET /domestic-scheduled-payment-consents/{ConsentId}", NONE),
    ("POST /domestic-scheduled-payments", DOMESTIC_SCHEDULED),
    ("GET /domestic-scheduled-payments/{DomesticScheduledPaymentId}", NONE),
    ("POST /domestic-standing-order-consents", DOMESTIC_STANDING),
    ("GET /domestic-standing-order-consents/{ConsentId}", NONE),
    ("POST /domestic-standing-orders", DOMESTIC_STANDING),
    ("GET /domestic-standing-orders/{DomesticStandingOrderId}", NONE),
    ("POST /international-payment-consents", INTERNATIONAL),
    ("GET /international-payment-consents/{ConsentId}", NONE),
    ("GET /international-payment-consents/{ConsentId}/funds-confirmation", NONE),
    ("POST /international-payments", INTERNATIONAL),
    ("GET /international-payments/{InternationalPaymentId}", NONE),
    ("POST /international-scheduled-payment-consents", INTERNATIONAL_SCHEDULED),
    ("GET /international-scheduled-payment-consents/{ConsentId}", NONE),
    ("GET /international-scheduled-payment-consents/{ConsentId}/funds-confirmation", NONE),
    ("POST /international-scheduled-payments", INTERNATIONAL_SCHEDULED),
    ("GET /international-scheduled-payments/{InternationalScheduledPaymentId}", NONE),
    ("POST /international-standing-order-consents", INTERNATIONAL_STANDING),
    ("GET /international-standing-order-consents/{ConsentId}", NONE),
    ("POST /international-standing-orders", INTERNATIONAL_STANDING),
    ("GET /international-standing-orders/{InternationalStandingOrderPaymentId}", NONE),
    ("POST /file-payment-consents", NONE),
    ("GET /file-payment-consents/{ConsentId}", NONE),
    ("POST /file-payment-consents/{ConsentId}/file", NONE),
    ("GET /file-payment-consents/{ConsentId}/file", NONE),
    ("POST /file-payments", NONE),
    ("GET /file-payments/{FilePaymentId}", NONE),
    ("GET /file-payments/{FilePaymentId}/report-file", NONE),
    // Confirmation of Funds API
    ("POST /funds-confirmation-consents", CBPII_DEBTOR),
    ("GET /funds-confirmation-consents/{ConsentId}", NONE),
    ("DELETE /funds-confirmation-consents/{ConsentId}", NONE),
    ("POST /funds-confirmations", INSTRUCTED_AMOUNT),
];

/// Read-only lookup built once from [`ENDPOINT_REQUIREMENTS`].
static ENDPOINT_TABLE: LazyLock<BTreeMap<&'static str, &'static [&'static str]>> =
    LazyLock::new(|| ENDPOINT_REQUIREMENTS.iter().copied().collect());

/// Returns the extra fields an endpoint requires, if it is known.
#[must_use]
pub fn endpoint_requirements(key: &str) -> Option<&'static [&'static str]> {
    ENDPOINT_TABLE.get(key).copied()
}

// ============================================================================
// SECTION: Resolver
// ============================================================================

/// Returns the configuration fields required by a discovery model.
///
/// Baseline fields come first, then endpoint fields in document order.
/// Duplicate names keep the first rule seen.
#[must_use]
pub fn field_rules(model: &Model) -> Vec<ConfigField> {
    let mut candidates = client_requirements();
    candidates.extend(well_known_requirements());
    for endpoint in model.endpoints() {
        let Some(fields) = endpoint_requirements(&endpoint.key()) else {
            continue;
        };
        candidates.extend(fields.iter().copied().map(ConfigField::required));
    }
    merge_first_wins(candidates)
}

/// Reduces candidates to unique names, keeping the first occurrence.
fn merge_first_wins(candidates: Vec<ConfigField>) -> Vec<ConfigField> {
    let mut seen = BTreeSet::new();
    candidates.into_iter().filter(|field| seen.insert(field.field_name.clone())).collect()
}

// ============================================================================
// SECTION: Tests
// ============================================================================
