use anyhow::Result;
use reqwest::Client;

const SPDX_LICENSE_URL: &str = "https://spdx.org/licenses";

/// Fetch the canonical text of an SPDX license from spdx.org.
pub async fn fetch_license_text(client: &Client, id: &str) -> Result<Option<String>> {
    let url = format!("{}/{}.json", SPDX_LICENSE_URL, id);

    let response = client
        .get(&url)
        .header("User-Agent", "license-builder/0.1.0 (attribution tool)")
        .send()
        .await?;

    if !response.status().is_success() {
        return Ok(None);
    }

    let data: serde_json::Value = response.json().await?;
    Ok(license_text(&data))
}

fn license_text(data: &serde_json::Value) -> Option<String> {
    data.get("licenseText")
        .and_then(|t| t.as_str())
        .filter(|t| !t.trim().is_empty())
        .map(str::to_string)
}
