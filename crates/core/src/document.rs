//! Plain-text estimate documents.
//!
//! Rendering only formats figures already computed by the engine; nothing here prices.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;
use tera::{Context, Tera};

use crate::domain::numeric::decimal_from_value;
use crate::engine::breakdown::ProfitBreakdown;
use crate::engine::PricingResult;

const CLIENT_QUOTE_TEMPLATE: &str = "client_quote.txt.tera";
const INTERNAL_BREAKDOWN_TEMPLATE: &str = "internal_breakdown.txt.tera";

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("template error: {0}")]
    Template(String),
    #[error("render error: {0}")]
    Render(String),
}

pub trait DocumentRenderer: Send + Sync {
    fn render_client_quote(
        &self,
        client_name: &str,
        pricing: &PricingResult,
    ) -> Result<String, DocumentError>;

    fn render_internal_breakdown(
        &self,
        client_name: &str,
        breakdown: &ProfitBreakdown,
    ) -> Result<String, DocumentError>;
}

/// Formats a decimal (as number or string) with two decimal places.
/// Usage: `amount | money`
fn tera_money_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let amount = decimal_from_value(value).unwrap_or(Decimal::ZERO).round_dp(2);
    Ok(tera::Value::String(format!("{amount:.2}")))
}

pub fn register_template_filters(tera: &mut Tera) {
    tera.register_filter("money", tera_money_filter);
}

#[derive(Debug)]
pub struct TeraDocumentRenderer {
    tera: Tera,
}

impl TeraDocumentRenderer {
    pub fn with_embedded_templates() -> Result<Self, DocumentError> {
        let mut tera = Tera::default();
        register_template_filters(&mut tera);

        tera.add_raw_templates(vec![
            (
                CLIENT_QUOTE_TEMPLATE,
                include_str!("../../../templates/documents/client_quote.txt.tera"),
            ),
            (
                INTERNAL_BREAKDOWN_TEMPLATE,
                include_str!("../../../templates/documents/internal_breakdown.txt.tera"),
            ),
        ])
        .map_err(|error| DocumentError::Template(error.to_string()))?;

        Ok(Self { tera })
    }

    fn render<T: Serialize>(
        &self,
        template: &str,
        client_name: &str,
        data: &T,
    ) -> Result<String, DocumentError> {
        let mut context = Context::from_serialize(data)
            .map_err(|error| DocumentError::Render(error.to_string()))?;
        context.insert("client_name", client_name);

        let rendered = self
            .tera
            .render(template, &context)
            .map_err(|error| DocumentError::Render(error.to_string()))?;

        tracing::debug!(
            event_name = "document.rendered",
            template,
            bytes = rendered.len(),
            "document rendered"
        );
        Ok(rendered)
    }
}

impl DocumentRenderer for TeraDocumentRenderer {
    fn render_client_quote(
        &self,
        client_name: &str,
        pricing: &PricingResult,
    ) -> Result<String, DocumentError> {
        self.render(CLIENT_QUOTE_TEMPLATE, client_name, pricing)
    }

    fn render_internal_breakdown(
        &self,
        client_name: &str,
        breakdown: &ProfitBreakdown,
    ) -> Result<String, DocumentError> {
        self.render(INTERNAL_BREAKDOWN_TEMPLATE, client_name, breakdown)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rust_decimal::Decimal;

    use super::{tera_money_filter, DocumentRenderer, TeraDocumentRenderer};
    use crate::domain::estimate::{EstimateContext, LineItem};
    use crate::domain::settings::GlobalSettings;
    use crate::engine::breakdown::ProfitBreakdown;
    use crate::engine::price_estimate;

    fn priced() -> crate::engine::PricingResult {
        let context = EstimateContext::new(
            vec![
                LineItem::new("Pipe", Decimal::new(10, 0), "m", Decimal::new(100, 0)),
                LineItem::new("Clamp", Decimal::new(5, 0), "pcs", Decimal::new(10, 0)),
            ],
            Decimal::new(2, 0),
            None,
        );
        price_estimate(&context, &GlobalSettings::default())
    }

    #[test]
    fn money_filter_accepts_strings_and_numbers() {
        let args = HashMap::new();
        assert_eq!(
            tera_money_filter(&tera::Value::String("1449.999".to_string()), &args).expect("filter"),
            tera::Value::String("1450.00".to_string())
        );
        assert_eq!(
            tera_money_filter(&serde_json::json!(12.5), &args).expect("filter"),
            tera::Value::String("12.50".to_string())
        );
        assert_eq!(
            tera_money_filter(&tera::Value::Null, &args).expect("filter"),
            tera::Value::String("0.00".to_string())
        );
    }

    #[test]
    fn client_quote_shows_reconciled_figures_and_validity_note() {
        let renderer = TeraDocumentRenderer::with_embedded_templates().expect("templates load");
        let document = renderer.render_client_quote("Asha Traders", &priced()).expect("render");

        assert!(document.contains("Client: Asha Traders"));
        assert!(document.contains("Pipe | 10 m | 140.00 | 1400.00"));
        assert!(document.contains("Labor | 2030.00"));
        assert!(document.contains("Grand Total: 3500.00"));
        assert!(document.contains("Advance Required: 3100.00"));
        assert!(document.contains("estimate only"));
        assert!(document.contains("Valid for 7 days"));
        assert!(!document.contains("profit"));
    }

    #[test]
    fn internal_breakdown_lists_row_profit() {
        let renderer = TeraDocumentRenderer::with_embedded_templates().expect("templates load");
        let breakdown = ProfitBreakdown::from_pricing(&priced());
        let document =
            renderer.render_internal_breakdown("Asha Traders", &breakdown).expect("render");

        assert!(document.contains("CONFIDENTIAL"));
        assert!(document.contains("profit 400.00"));
        assert!(document.contains("Labor | cost 2000.00 | charged 2030.00 | profit 30.00"));
        assert!(document.contains("Net Profit: 450.00"));
        assert!(document.contains("Material Profit: 420.00"));
    }
}
