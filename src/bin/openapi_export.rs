// Prints the OpenAPI document served at /api-docs/openapi.json
use utoipa::OpenApi;

use failure_translator::api::openapi::ApiDoc;

fn main() -> anyhow::Result<()> {
    println!("{}", ApiDoc::openapi().to_pretty_json()?);
    Ok(())
}
