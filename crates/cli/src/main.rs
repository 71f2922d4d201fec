use anyhow::Context;
use clap::Parser;
use glidepath_core::advice::{assess, Advice, Advisor};
use glidepath_core::domain::questionnaire::{InputError, Questionnaire};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "glidepath", about = "Retirement allocation questionnaire")]
struct Args {
    /// Your current age in whole years.
    #[arg(long)]
    age: u32,

    /// male or female (case-insensitive).
    #[arg(long)]
    gender: String,

    /// Current yearly income.
    #[arg(long)]
    income: f64,

    /// Age at which you want to retire.
    #[arg(long)]
    retirement_age: u32,

    #[arg(long)]
    married: bool,

    /// Only used together with --married.
    #[arg(long)]
    spouse_income: Option<f64>,

    /// Number of kids you have or plan to have.
    #[arg(long, default_value_t = 0)]
    kids: u32,

    /// Target retirement savings amount.
    #[arg(long)]
    target_savings: f64,

    /// You own a house or plan to buy one.
    #[arg(long)]
    owns_house: bool,

    /// Skip fetching market data; print the allocation plan only.
    #[arg(long)]
    no_recommendations: bool,

    /// Print the full result as JSON instead of text.
    #[arg(long)]
    json: bool,
}

impl Args {
    fn questionnaire(&self) -> Questionnaire {
        Questionnaire {
            age: self.age,
            gender: self.gender.clone(),
            current_income: self.income,
            retirement_age: self.retirement_age,
            married: self.married,
            spouse_income: self.spouse_income,
            kids: self.kids,
            target_savings: self.target_savings,
            owns_house: self.owns_house,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = glidepath_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let advice = match run(&args, &settings).await {
        Ok(advice) => advice,
        Err(err) => {
            if should_report(&err) {
                sentry_anyhow::capture_anyhow(&err);
                tracing::error!(error = %err, "advice failed");
            } else {
                tracing::info!(error = %err, "questionnaire rejected");
            }
            return Err(err);
        }
    };

    if args.json {
        let out = serde_json::to_string_pretty(&advice).context("serialize advice failed")?;
        println!("{out}");
    } else {
        print!("{}", glidepath_core::report::render_text(&advice));
    }

    Ok(())
}

async fn run(args: &Args, settings: &glidepath_core::config::Settings) -> anyhow::Result<Advice> {
    if args.no_recommendations {
        let assessment = assess(args.questionnaire()).context("invalid input")?;
        return Ok(Advice::without_recommendations(assessment));
    }

    let advisor = Advisor::from_settings(settings)?;
    tracing::info!(
        provider = advisor.provider_name(),
        base_url = %settings.market_data_base_url,
        timeout = ?settings.recommendation_timeout,
        "fetching recommendations"
    );

    let advice = tokio::select! {
        res = advisor.advise(args.questionnaire()) => res.context("invalid input")?,
        _ = tokio::signal::ctrl_c() => anyhow::bail!("interrupted"),
    };
    Ok(advice)
}

/// Bad input is the caller's problem; only infrastructure failures go to sentry.
fn should_report(err: &anyhow::Error) -> bool {
    err.downcast_ref::<InputError>().is_none()
}

fn init_sentry(settings: &glidepath_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
