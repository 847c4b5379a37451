//! Checkout hand-off: render the order summary and build the `wa.me` link.
//!
//! There is no in-app payment capture; checkout ends with the customer sending
//! this pre-filled message to the store's WhatsApp number.

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use rust_decimal::Decimal;

use crate::delivery::DeliveryDecision;
use crate::order::OrderDraft;

/// Build a `wa.me` deep link that opens a chat with `store_phone` and the
/// given message pre-filled. Non-digits in the phone number are dropped.
#[must_use]
pub fn checkout_link(store_phone: &str, message: &str) -> String {
    let digits: String = store_phone.chars().filter(char::is_ascii_digit).collect();
    let encoded = utf8_percent_encode(message, NON_ALPHANUMERIC);
    format!("https://wa.me/{digits}?text={encoded}")
}

/// Render the plain-text order summary sent to the store.
///
/// The delivery fee line depends on the quote: a concrete fee when the
/// resolver allowed the order, and "a combinar" (to be arranged) when the
/// fee could not be determined.
#[must_use]
pub fn checkout_message(store_name: &str, draft: &OrderDraft, decision: &DeliveryDecision) -> String {
    let mut lines = vec![format!("*Novo pedido — {store_name}*"), String::new()];

    for item in &draft.items {
        let line_total = item.unit_price * Decimal::from(item.quantity);
        lines.push(format!(
            "{}x {} — R$ {}",
            item.quantity,
            item.name,
            line_total.round_dp(2)
        ));
    }

    let subtotal = draft.subtotal();
    lines.push(String::new());
    lines.push(format!("Subtotal: R$ {}", subtotal.round_dp(2)));

    match decision {
        DeliveryDecision::Allowed { fee, .. } => {
            lines.push(format!("Entrega: R$ {}", fee.round_dp(2)));
            lines.push(format!("*Total: R$ {}*", (subtotal + fee).round_dp(2)));
        }
        DeliveryDecision::Undetermined => {
            lines.push("Entrega: a combinar".to_string());
            lines.push(format!("*Total: R$ {} + entrega*", subtotal.round_dp(2)));
        }
        // Callers do not build messages for rejected checkouts; render the
        // subtotal anyway so the function stays total.
        DeliveryDecision::Rejected { .. } => {
            lines.push(format!("*Total: R$ {}*", subtotal.round_dp(2)));
        }
    }

    lines.push(String::new());
    lines.push(format!("Cliente: {}", draft.customer.name));
    lines.push(format!("Telefone: {}", draft.customer.phone));
    lines.push(format!("Endereço: {}", draft.customer.address));
    lines.push(format!("Pagamento: {}", draft.payment_method));
    if let Some(change_for) = draft.change_for {
        lines.push(format!("Troco para: R$ {}", change_for.round_dp(2)));
    }

    lines.join("\n")
}
