//! Walks the Ordnance Server API against a running instance.
//!
//! ```text
//! cargo run -p ordnance-server --example api_client
//! ```

use reqwest::Client;
use serde_json::Value;

const SERVER_URL: &str = "http://localhost:8080";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let client = Client::new();

    println!("1. Health Check:");
    let resp = client.get(format!("{SERVER_URL}/health")).send().await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    println!("2. Readiness (store authentication):");
    let resp = client.get(format!("{SERVER_URL}/ready")).send().await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    println!("3. Test data (max=3):");
    print_envelope(&client, &format!("{SERVER_URL}/ordnance/test?max=3")).await?;

    println!("4. Postcode lookup:");
    print_envelope(&client, &format!("{SERVER_URL}/ordnance/postcode/SO16%200AS")).await?;

    println!("5. South West postcode lookup:");
    print_envelope(&client, &format!("{SERVER_URL}/ordnance/sw/TR18%204AA?max=5")).await?;

    println!("6. Location lookup (northing 114850, easting 438750, 50m):");
    print_envelope(
        &client,
        &format!("{SERVER_URL}/ordnance/location/uk/114850/438750?tolerance=50"),
    )
    .await?;

    println!("7. Grid reference lookup:");
    print_envelope(
        &client,
        &format!("{SERVER_URL}/ordnance/location/gridref/SU3875014850?tolerance=25"),
    )
    .await?;

    println!("8. Malformed grid reference:");
    let resp = client
        .get(format!("{SERVER_URL}/ordnance/location/gridref/QQ123"))
        .send()
        .await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);

    Ok(())
}

async fn print_envelope(client: &Client, url: &str) -> anyhow::Result<()> {
    let resp = client.get(url).send().await?;
    let status = resp.status();
    let body: Value = resp.json().await?;
    println!("Status: {status}");
    println!(
        "responseId={} newConnection={} size={}",
        body["responseId"], body["newConnection"], body["size"]
    );
    println!("{}", serde_json::to_string_pretty(&body["content"])?);
    println!();
    Ok(())
}
