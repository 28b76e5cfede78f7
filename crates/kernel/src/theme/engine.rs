//! Theme engine with Tera templates.

use std::path::Path;

use anyhow::{Context, Result};
use tera::Tera;
use tracing::debug;

/// Templates compiled into the binary, as (name, source) pairs.
const BUILTIN_TEMPLATES: [(&str, &str); 5] = [
    ("layout.html", include_str!("../../templates/layout.html")),
    ("page.html", include_str!("../../templates/page.html")),
    ("users.html", include_str!("../../templates/users.html")),
    ("login.html", include_str!("../../templates/login.html")),
    ("not_found.html", include_str!("../../templates/not_found.html")),
];

/// Theme engine for rendering templates.
pub struct ThemeEngine {
    /// Tera template engine instance.
    tera: Tera,
}

impl ThemeEngine {
    /// Create a theme engine from the built-in templates.
    pub fn builtin() -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(BUILTIN_TEMPLATES)
            .context("failed to compile built-in templates")?;

        Ok(Self { tera })
    }

    /// Create a theme engine from a directory. Any name the directory does
    /// not provide falls back to the built-in template.
    pub fn new(template_dir: &Path) -> Result<Self> {
        let pattern = template_dir.join("**/*.html");
        let pattern_str = pattern
            .to_str()
            .context("invalid template directory path")?;

        let mut tera = Tera::new(pattern_str).context("failed to initialize Tera templates")?;

        let template_names: Vec<_> = tera.get_template_names().collect();
        debug!(count = template_names.len(), dir = %template_dir.display(), "loaded template overrides");

        // extend() keeps templates already present, so overrides win.
        let builtin = Self::builtin()?;
        tera.extend(&builtin.tera)
            .context("failed to merge built-in templates")?;

        Ok(Self { tera })
    }

    /// Get the underlying Tera instance for custom operations.
    pub fn tera(&self) -> &Tera {
        &self.tera
    }

    /// Render a template by name.
    pub fn render(&self, template: &str, context: &tera::Context) -> Result<String> {
        self.tera
            .render(template, context)
            .with_context(|| format!("failed to render template {template}"))
    }
}
