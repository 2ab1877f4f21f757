#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    exam_remuneration_server::run().await
}
