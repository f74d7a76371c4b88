use circl_cve_client::circl::cpe::extract_cpe;
use circl_cve_client::{Context, ServiceClient};

pub async fn run(client: &ServiceClient, ctx: &Context) -> Result<(), String> {
    println!("Scenario: lookup");

    let cve = client
        .get_cve(ctx, "CVE-2018-15919")
        .await
        .map_err(|e| e.to_string())?;
    println!("{}: {}", cve, cve.summary);

    let capec = client
        .get_capec(ctx, "CAPEC-13")
        .await
        .map_err(|e| e.to_string())?;
    println!("CAPEC-{}: {}", capec, capec.name);

    let cwe = client.get_cwe(ctx, "200").await.map_err(|e| e.to_string())?;
    println!("{}: {}", cwe, cwe.name);

    let cpe = client
        .get_cpe(ctx, "cpe:/a:openbsd:openssh:7.5:-")
        .await
        .map_err(|e| e.to_string())?;
    let components = extract_cpe(&cpe.cpe23_uri).map_err(|e| e.to_string())?;
    println!(
        "{}: vendor={} product={} ({} known CVEs)",
        cpe,
        components["vendor"],
        components["product"],
        cpe.vulnerabilities.len()
    );

    Ok(())
}
