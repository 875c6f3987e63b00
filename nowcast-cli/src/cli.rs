use anyhow::{Context, anyhow};
use chrono::{DateTime, NaiveDateTime, Utc};
use clap::{Parser, Subcommand};
use inquire::{Select, Text};
use nowcast_core::{
    Config, FixedLocation, ForecastWindow, GeoCoordinate, Language, LoginFlow, LoginState,
    NavigationPolicy, WeatherQueryPipeline, WeatherView,
    auth::{AuthSessionGate, KakaoAuthClient},
    grid,
    location::NoGeocoder,
    provider::{forecast_source_from_config, geocoder_from_config},
};

use crate::terminal::{ConsoleNavigator, PasteBrowser};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "nowcast", version, about = "KMA nowcast and Kakao login")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure credentials and display options.
    Configure,

    /// Print the forecast grid cell for a coordinate.
    Grid {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },

    /// Print the latest published observation window.
    Window {
        /// RFC 3339 instant, or "YYYY-MM-DD HH:MM" in Korea Standard Time.
        /// Defaults to now.
        #[arg(long)]
        at: Option<String>,
    },

    /// Show current weather observations for a coordinate.
    Show {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Override the configured language.
        #[arg(long, value_parser = parse_language)]
        language: Option<Language>,
    },

    /// Sign in with Kakao.
    Login,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Grid { lat, lon } => {
                let cell = grid::project(GeoCoordinate::new(lat, lon));
                println!("nx={} ny={}", cell.nx, cell.ny);
                if !cell.is_within_kma_domain() {
                    println!("(outside the KMA forecast grid)");
                }
                Ok(())
            }
            Command::Window { at } => {
                let window = match at {
                    Some(at) => parse_window(&at)?,
                    None => ForecastWindow::for_instant(Utc::now()),
                };
                println!("base_date={} base_time={}", window.base_date_str(), window.base_time_str());
                Ok(())
            }
            Command::Show { lat, lon, language } => show(lat, lon, language).await,
            Command::Login => login().await,
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load_file()?;

    let kakao = Text::new("Kakao REST API key:")
        .with_default(config.kakao_rest_api_key.as_deref().unwrap_or_default())
        .prompt()?;
    let kma = Text::new("KMA service key (data.go.kr):")
        .with_default(config.kma_service_key.as_deref().unwrap_or_default())
        .prompt()?;

    let language = Select::new("Display language:", vec!["english", "korean"]).prompt()?;
    let navigation = Select::new(
        "After login, enter the app:",
        vec!["after_profile", "optimistic"],
    )
    .prompt()?;

    config.kakao_rest_api_key = Some(kakao.trim().to_string()).filter(|k| !k.is_empty());
    config.kma_service_key = Some(kma.trim().to_string()).filter(|k| !k.is_empty());
    config.language = parse_language(language).map_err(|e| anyhow!(e))?;
    config.navigation = match navigation {
        "optimistic" => NavigationPolicy::Optimistic,
        _ => NavigationPolicy::AfterProfile,
    };

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn show(lat: f64, lon: f64, language: Option<Language>) -> anyhow::Result<()> {
    let config = Config::load()?;
    let source = forecast_source_from_config(&config)?;
    let location = FixedLocation(GeoCoordinate::new(lat, lon));
    let language = language.unwrap_or(config.language);

    let result = match geocoder_from_config(&config) {
        Some(geocoder) => {
            WeatherQueryPipeline::new(location, geocoder, source)
                .with_language(language)
                .run(Utc::now())
                .await
        }
        None => {
            WeatherQueryPipeline::new(location, NoGeocoder, source)
                .with_language(language)
                .run(Utc::now())
                .await
        }
    };

    match WeatherView::from_result(result) {
        WeatherView::Ready(report) => {
            let place = report
                .address
                .filter(|a| !a.is_empty())
                .unwrap_or_else(|| format!("{lat:.4}, {lon:.4}"));
            println!("{place}");
            println!(
                "observed {} (grid {},{})",
                report.window, report.grid.nx, report.grid.ny
            );
            for line in &report.lines {
                println!("  {line}");
            }
            Ok(())
        }
        WeatherView::Failed(message) => Err(anyhow!(message)),
        WeatherView::Loading => Ok(()),
    }
}

async fn login() -> anyhow::Result<()> {
    let config = Config::load()?;
    let client = KakaoAuthClient::new(config.kakao_auth()?);

    let mut flow = LoginFlow::new(client, AuthSessionGate::global()).with_policy(config.navigation);
    let outcome = flow.run(&PasteBrowser, &ConsoleNavigator).await?;

    match outcome.state {
        LoginState::ProfileFetched => {
            if let Some(profile) = outcome.profile {
                println!("Hello, {}!", profile.nickname);
            }
            Ok(())
        }
        LoginState::AuthorizationFailed => Err(anyhow!("Login was not authorized")),
        state if outcome.navigated => {
            // Already signed in optimistically; the profile just isn't available.
            tracing::warn!(?state, "Login finished without a profile");
            Ok(())
        }
        state => Err(anyhow!("Login did not complete ({state:?})")),
    }
}

fn parse_language(value: &str) -> Result<Language, String> {
    match value.to_ascii_lowercase().as_str() {
        "english" | "en" => Ok(Language::English),
        "korean" | "ko" => Ok(Language::Korean),
        other => Err(format!("unknown language '{other}', expected english or korean")),
    }
}

fn parse_window(at: &str) -> anyhow::Result<ForecastWindow> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(at) {
        return Ok(ForecastWindow::for_instant(instant.with_timezone(&Utc)));
    }

    let local = NaiveDateTime::parse_from_str(at, "%Y-%m-%d %H:%M")
        .with_context(|| format!("Invalid time '{at}', expected RFC 3339 or YYYY-MM-DD HH:MM"))?;
    Ok(ForecastWindow::for_local(local))
}
