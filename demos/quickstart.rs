use kashtat_admin_client::{ApiClient, Config, Payload, RequestDescriptor};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Optional: enable basic logging for the example
    let _ = tracing_subscriber::fmt().try_init();

    // Load configuration from a JSON file placed next to the binary
    let cfg = Config::from_file("config.json")?;
    let client = ApiClient::new(cfg)?;

    let session = client.session();
    if !session.is_authenticated() {
        let email = std::env::var("KASHTAT_ADMIN_EMAIL")?;
        let password = std::env::var("KASHTAT_ADMIN_PASSWORD")?;
        session.login(&email, &password).await?;
    }

    let users = client
        .request(
            &RequestDescriptor::get("/admin/users")
                .with_payload(Payload::new().with("page", 1).with("search", "sara")),
        )
        .await?
        .error_for_status()?;
    println!("{} after {} attempt(s)", users.status(), users.attempts());
    println!("{}", users.body());
    Ok(())
}
