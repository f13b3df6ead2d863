use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    cli::run_cli(lti_dao_migration::Migrator).await;
}
