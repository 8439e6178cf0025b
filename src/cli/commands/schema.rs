use serde_json::json;

use crate::cli::{utils, OutputFormat};

pub fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let sdl = crate::graphql::sdl();

    match output_format {
        OutputFormat::Json => utils::output_success(&output_format, "Schema exported", Some(json!({ "sdl": sdl }))),
        OutputFormat::Text => {
            println!("{}", sdl);
            Ok(())
        }
    }
}
