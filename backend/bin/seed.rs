//! Development seeder: ticket offers, a starter game catalog and one
//! terminal with both slots populated. Skips any table that already has
//! rows, so it is safe to re-run.

use retronova::db::DatabaseConfig;
use retronova::{get_db_pool, utils};
use sqlx::PgPool;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    utils::init_logging();

    let db_config = DatabaseConfig::from_env()?;
    let pool = get_db_pool(&db_config).await?;

    retronova::db::migrations::run_migrations(&pool).await?;

    seed_offers(&pool).await?;
    seed_games_and_arcade(&pool).await?;

    println!("Seed data in place.");
    Ok(())
}

async fn seed_offers(pool: &PgPool) -> anyhow::Result<()> {
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ticket_offers")
        .fetch_one(pool)
        .await?;
    if existing > 0 {
        println!("ticket_offers already seeded, skipping");
        return Ok(());
    }

    let offers = [
        ("Starter", 10, 15.0),
        ("Regular", 25, 30.0),
        ("Champion", 60, 60.0),
    ];

    for (name, tickets, price) in offers {
        sqlx::query("INSERT INTO ticket_offers (name, tickets_amount, price_euros) VALUES ($1, $2, $3)")
            .bind(name)
            .bind(tickets)
            .bind(price)
            .execute(pool)
            .await?;
    }

    println!("seeded {} ticket offers", offers.len());
    Ok(())
}

async fn seed_games_and_arcade(pool: &PgPool) -> anyhow::Result<()> {
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM games")
        .fetch_one(pool)
        .await?;
    if existing > 0 {
        println!("games already seeded, skipping");
        return Ok(());
    }

    let games = [
        ("Pixel Brawl", "Two-player fighting classic", 2, 2, 2),
        ("Star Runner", "Solo endless racer", 1, 1, 1),
        ("Twin Tanks", "Co-op or versus tank duel", 1, 2, 2),
    ];

    let mut game_ids = Vec::new();
    for (name, description, min_players, max_players, ticket_cost) in games {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO games (name, description, min_players, max_players, ticket_cost)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(min_players)
        .bind(max_players)
        .bind(ticket_cost)
        .fetch_one(pool)
        .await?;
        game_ids.push(id);
    }

    let arcade_id: i32 = sqlx::query_scalar(
        r#"
        INSERT INTO arcades (name, description, api_key, location, latitude, longitude)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind("Downtown Arcade")
    .bind("Reference terminal for local development")
    .bind("arcade_key_dev_seed_terminal_1")
    .bind("12 Rue des Jeux, Paris")
    .bind(48.8566)
    .bind(2.3522)
    .fetch_one(pool)
    .await?;

    for (slot, game_id) in game_ids.iter().take(2).enumerate() {
        sqlx::query(
            "INSERT INTO arcade_games (arcade_id, game_id, slot_number) VALUES ($1, $2, $3)",
        )
        .bind(arcade_id)
        .bind(*game_id)
        .bind(slot as i32 + 1)
        .execute(pool)
        .await?;
    }

    println!("seeded {} games and 1 arcade", game_ids.len());
    Ok(())
}
