use academia_calendar::{get_calendar, Config};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::from_env()?;
    let token = std::env::var("ACADEMIA_TOKEN").unwrap_or_default();

    let calendar = get_calendar(&config, &token)?;
    match &calendar.today {
        Some(today) => println!(
            "{} {} day order {} {}",
            today.day,
            today.date,
            today.day_order(),
            today.event.as_deref().unwrap_or("")
        ),
        None => println!("Today is not in the academic planner"),
    }
    if let Some(last) = calendar.last_working_day() {
        println!("Last working day: {} {}", last.day, last.date);
    }
    Ok(())
}
