use datachat_domain::{Error, Template};
use handlebars::{Handlebars, no_escape};
use lazy_static::lazy_static;
use rust_embed::Embed;

#[derive(Embed)]
#[folder = "../../templates/"]
struct TemplateSource;

/// Creates a Handlebars instance with strict mode, no HTML escaping, the
/// `json` helper, and every embedded prompt template registered under its file
/// name.
fn create_handlebar() -> Handlebars<'static> {
    let mut hb = Handlebars::new();
    hb.set_strict_mode(true);
    hb.register_escape_fn(no_escape);

    // Register the 'json' helper to serialize a value as a JSON string
    hb.register_helper(
        "json",
        Box::new(
            |h: &handlebars::Helper,
             _: &handlebars::Handlebars,
             _: &handlebars::Context,
             _: &mut handlebars::RenderContext,
             out: &mut dyn handlebars::Output|
             -> handlebars::HelperResult {
                let value = h.param(0).ok_or_else(|| {
                    handlebars::RenderErrorReason::ParamNotFoundForIndex("json", 0)
                })?;
                let json_string = serde_json::to_string(value.value())
                    .map_err(|e| handlebars::RenderErrorReason::NestedError(Box::new(e)))?;
                out.write(&json_string)?;
                Ok(())
            },
        ),
    );

    hb.register_embed_templates::<TemplateSource>()
        .expect("embedded prompt templates must parse");

    hb
}

lazy_static! {
    /// Shared template engine, initialized on first use.
    static ref HANDLEBARS: Handlebars<'static> = create_handlebar();
}

/// Renders the embedded prompt templates.
pub struct TemplateEngine<'a> {
    handlebar: Handlebars<'a>,
}

impl Default for TemplateEngine<'_> {
    fn default() -> Self {
        Self { handlebar: HANDLEBARS.clone() }
    }
}

impl TemplateEngine<'_> {
    /// Renders a registered template with the provided data.
    pub fn render<V: serde::Serialize>(
        &self,
        template: &Template<V>,
        data: &V,
    ) -> anyhow::Result<String> {
        self.handlebar
            .render(template.name(), data)
            .map_err(|err| {
                Error::Template { name: template.name().to_string(), message: err.to_string() }
                    .into()
            })
    }
}
