use handlebars::Handlebars;
use serde::Serialize;

use crate::{FormattedResponse, Variables};

const TEMPLATE_NAME: &str = "graphiql.html";

/// Data GraphiQL is pre-populated with.
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphiqlPage<'a> {
    pub query: Option<&'a str>,
    pub variables: Option<&'a Variables>,
    pub operation_name: Option<&'a str>,
    /// `None` when nothing was executed.
    pub result: Option<&'a FormattedResponse>,
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("serializing page data: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("rendering template: {0}")]
    Template(#[from] handlebars::RenderError),
}

pub trait PageRenderer: Send + Sync {
    fn render(&self, page: &GraphiqlPage<'_>) -> Result<String, RenderError>;
}

/// Renders GraphiQL, loaded from a CDN.
pub struct GraphiqlRenderer {
    handlebars: Handlebars<'static>,
}

impl Default for GraphiqlRenderer {
    fn default() -> Self {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        handlebars
            .register_template_string(TEMPLATE_NAME, include_str!("templates/graphiql.hbs"))
            .expect("must be valid");
        GraphiqlRenderer { handlebars }
    }
}

#[derive(Serialize)]
struct TemplateData {
    query: String,
    variables: String,
    operation_name: String,
    result: String,
}

impl PageRenderer for GraphiqlRenderer {
    fn render(&self, page: &GraphiqlPage<'_>) -> Result<String, RenderError> {
        let variables = page.variables.map(serde_json::to_string_pretty).transpose()?;
        let result = page.result.map(serde_json::to_string_pretty).transpose()?;

        let data = TemplateData {
            query: script_literal(page.query)?,
            variables: script_literal(variables.as_deref())?,
            operation_name: script_literal(page.operation_name)?,
            result: script_literal(result.as_deref())?,
        };

        Ok(self.handlebars.render(TEMPLATE_NAME, &data)?)
    }
}

/// A JavaScript string literal safe to embed in a `<script>` tag, or `undefined`.
fn script_literal(value: Option<&str>) -> Result<String, serde_json::Error> {
    match value {
        Some(value) => Ok(serde_json::to_string(value)?.replace("</", "<\\/")),
        None => Ok("undefined".to_string()),
    }
}
