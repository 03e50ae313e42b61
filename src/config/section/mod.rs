//! Configuration section definitions.
//!
//! Each module corresponds to a section in `coolie.toml`:
//!
//! | Module | TOML Section             | Purpose                              |
//! |--------|--------------------------|--------------------------------------|
//! | `js`   | `[js]`                   | Entry modules, loader config         |
//! | `html` | `[html]`                 | Documents to resolve, resolver mode  |
//! | `css`  | `[css]`, `[resource]`    | Emitted stylesheets and resources    |
//! | `dest` | `[dest]`                 | Destination root, host, versioning   |

mod css;
mod dest;
mod html;
mod js;

pub use css::{CssConfig, ResourceConfig};
pub use dest::DestConfig;
pub use html::HtmlConfig;
pub use js::JsConfig;
