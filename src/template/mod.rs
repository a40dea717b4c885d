//! Theme template system
//!
//! Templates are `*.snip` files contributed by themes. A [`ThemeRegistry`]
//! maps each theme to the bindings it can see, a [`TemplateEngine`] renders
//! [`RenderUnit`]s against those bindings, and a [`ThemeScope`] decides
//! whether resolution follows the site theme or the request theme.
//!
//! # Example
//!
//! ```text
//! {# themes/Contoso/WelcomeBannerSnippet.snip #}
//! <section class="banner">
//!   <h2>{{ field "Title" [display: "Banner title"] }}</h2>
//!   {{ field "Body" [type: "Html"] }}
//! </section>
//! ```

mod engine;
mod registry;
mod scope;
mod unit;

pub use engine::{RenderEngine, RenderError, TemplateEngine, HTML_FIELD_TYPE};
pub use registry::{
    template_key, Binding, BindingRegistry, BindingTable, FixedTheme, RegistryError, Theme,
    ThemeRegistry, ThemeResolver, TEMPLATE_EXTENSION, THEME_MANIFEST,
};
pub use scope::{ScopeGuard, ThemeScope};
pub use unit::{FieldChannel, RenderMode, RenderUnit, RenderUnitFactory, UnitFactory};
