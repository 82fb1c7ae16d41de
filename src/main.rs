#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    rdebug_lib::run().await?;
    Ok(())
}
