//! View engine
//!
//! Renders pages with Tera. Templates are compiled into the binary from the
//! `templates/` directory; files in an optional override directory replace
//! the embedded template of the same relative name.

mod error;
mod navigation;

pub use error::ViewError;
pub use navigation::{NavItem, Navigation, Section};

use rust_embed::RustEmbed;
use std::error::Error as _;
use std::fs;
use std::path::Path;
use tera::{Context as TeraContext, Tera};

#[derive(RustEmbed)]
#[folder = "templates/"]
#[include = "*.html"]
struct EmbeddedTemplates;

pub struct ViewEngine {
    tera: Tera,
}

impl ViewEngine {
    /// Load the embedded templates, then apply overrides
    pub fn new(override_dir: Option<&Path>) -> Result<Self, ViewError> {
        let mut templates: Vec<(String, String)> = EmbeddedTemplates::iter()
            .filter_map(|name| {
                let file = EmbeddedTemplates::get(&name)?;
                let content = String::from_utf8_lossy(&file.data).into_owned();
                Some((name.into_owned(), content))
            })
            .collect();

        if let Some(dir) = override_dir {
            let mut overrides = Vec::new();
            collect_templates_from_dir(dir, dir, &mut overrides)?;
            for (name, content) in overrides {
                tracing::info!("Template override: {}", name);
                match templates.iter_mut().find(|(n, _)| *n == name) {
                    Some(existing) => existing.1 = content,
                    None => templates.push((name, content)),
                }
            }
        }

        let mut tera = Tera::default();
        tera.add_raw_templates(templates)
            .map_err(|e| ViewError::Template(format!("Failed to load templates: {}", chain(&e))))?;

        Ok(Self { tera })
    }

    pub fn render(&self, template: &str, context: &TeraContext) -> Result<String, ViewError> {
        self.tera
            .render(template, context)
            .map_err(|e| ViewError::Template(format!("Failed to render '{}': {}", template, chain(&e))))
    }

    /// Render, falling back to a plain error page
    pub fn render_with_fallback(&self, template: &str, context: &TeraContext) -> String {
        match self.render(template, context) {
            Ok(html) => html,
            Err(e) => {
                tracing::error!("{}", e);
                simple_error_page(template)
            }
        }
    }

    pub fn has_template(&self, template: &str) -> bool {
        self.tera.get_template_names().any(|name| name == template)
    }
}

/// Base context of every page
pub fn page_context(navigation: &Navigation) -> TeraContext {
    let mut context = TeraContext::new();
    context.insert("nav", navigation);
    context
}

/// Error message including every source
fn chain(e: &tera::Error) -> String {
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(s) = source {
        message.push_str(&format!("\n  Caused by: {}", s));
        source = s.source();
    }
    message
}

fn collect_templates_from_dir(
    base_path: &Path,
    current_path: &Path,
    templates: &mut Vec<(String, String)>,
) -> Result<(), ViewError> {
    if !current_path.exists() {
        return Ok(());
    }

    for entry in fs::read_dir(current_path)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_templates_from_dir(base_path, &path, templates)?;
        } else if path.extension().is_some_and(|ext| ext == "html") {
            let relative = path
                .strip_prefix(base_path)
                .map_err(|_| ViewError::Template("Failed to get relative path".to_string()))?;
            let name = relative.to_string_lossy().replace('\\', "/");
            templates.push((name, fs::read_to_string(&path)?));
        }
    }
    Ok(())
}

fn simple_error_page(template: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Template Error</title>
</head>
<body>
    <h1>Template Error</h1>
    <p>Failed to render <code>{}</code>. See the server log for details.</p>
</body>
</html>"#,
        template
    )
}

#[cfg(test)]
mod tests;
