//! Learnpath CLI
//!
//! Command-line client for the learning path backend:
//! - Log in, sign up, log out
//! - Submit the onboarding questionnaire
//! - Show the dashboard (progress, skills, recommendations, analytics)
//! - Complete a step with a self-assessment

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::PathBuf;

use learnpath::{
    generate_default_config, ApiClient, AssessmentInput, Config, Credentials, Dashboard,
    DashboardError, DashboardView, Environment, OnboardingForm, Recommendation, Session,
    SessionStore, StepView,
};

#[derive(Parser)]
#[command(name = "learnpath")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Learning path dashboard client")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: ~/.config/learnpath/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend URL, overrides the configured environment
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Backend environment (local, deployed)
    #[arg(long, global = true)]
    pub env: Option<Environment>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in with an existing account
    Login {
        email: String,
        /// Read from stdin when omitted
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Create an account
    Signup {
        email: String,
        /// Read from stdin when omitted
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Forget the stored session
    Logout,

    /// Show the stored session
    Status,

    /// Submit the onboarding questionnaire
    Onboard {
        #[arg(long)]
        age: String,
        #[arg(long)]
        gender: String,
        #[arg(long)]
        education: String,
        /// Learning goal, e.g. "Become a Data Scientist"
        #[arg(long)]
        goal: String,
        /// Extra answers in key=value format
        #[arg(short = 'P', long = "pref")]
        preferences: Vec<String>,
    },

    /// Show the dashboard
    Dashboard {
        /// Print the view model as JSON
        #[arg(long)]
        json: bool,
    },

    /// Mark a step completed
    Complete {
        /// Step number as shown by `dashboard` (starting at 1)
        step: usize,
        /// Difficulty 1 (easy) to 5 (hard)
        #[arg(short, long, default_value = "3")]
        difficulty: u8,
        /// Comprehension 0-100
        #[arg(short, long)]
        score: f64,
        /// Minutes spent
        #[arg(short, long, default_value = "0")]
        time: u32,
        #[arg(short, long, default_value = "")]
        notes: String,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(env) = cli.env {
        config.api.environment = env;
        config.api.base_url = None;
    }
    if let Some(url) = &cli.api_url {
        config.api.base_url = Some(url.clone());
    }

    learnpath::telemetry::init(&config.logging);
    tracing::debug!("Learnpath v{} using {}", env!("CARGO_PKG_VERSION"), config.api.base_url());

    let store = SessionStore::new(&config.session.file);
    let mut session = store.load();
    let client = ApiClient::new(&config.api)?
        .recommendations_endpoint(config.dashboard.recommendations_endpoint);

    match cli.command {
        Commands::Login { email, password } => {
            let credentials = Credentials {
                password: password_or_prompt(password)?,
                email,
            };
            let response = client
                .login(&credentials)
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            remember_user(&store, &mut session, response.user_id, &response.message)?;
        }

        Commands::Signup { email, password } => {
            let credentials = Credentials {
                password: password_or_prompt(password)?,
                email,
            };
            let response = client
                .signup(&credentials)
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            remember_user(&store, &mut session, response.user_id, &response.message)?;
        }

        Commands::Logout => {
            store.clear()?;
            println!("Logged out");
        }

        Commands::Status => {
            match &session.user_id {
                Some(id) => println!("Logged in as user {}", id),
                None => println!("Not logged in"),
            }
            println!("Onboarding submitted: {}", if session.form_submitted { "yes" } else { "no" });
            println!("Backend: {}", client.base_url());
        }

        Commands::Onboard {
            age,
            gender,
            education,
            goal,
            preferences,
        } => {
            let user_id = session.require_user()?.to_string();
            let mut form = OnboardingForm::new(age, gender, education, goal);
            for pref in preferences {
                match pref.split_once('=') {
                    Some((k, v)) => form = form.preference(k.trim(), v.trim()),
                    None => bail!("Invalid preference (expected key=value): {}", pref),
                }
            }
            form.validate()?;

            let response = client
                .submit_user_data(&user_id, &form)
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;

            session.form_submitted = true;
            store.save(&session)?;

            println!("{}", response.message);
            if !response.learning_path.is_empty() {
                println!("\nYour learning path:");
                for (i, step) in response.learning_path.iter().enumerate() {
                    let duration = step.duration.as_deref().unwrap_or("self-paced");
                    println!("  {}. {} ({})", i + 1, step.title, duration);
                }
            }
        }

        Commands::Dashboard { json } => {
            let user_id = session.require_user()?.to_string();
            let mut dashboard =
                Dashboard::new(client, user_id).skill_policy(config.dashboard.skill_policy);

            if let Err(e) = dashboard.load().await {
                report_load_failure(&e);
                std::process::exit(1);
            }

            let view = dashboard.view();
            if json {
                println!("{}", serde_json::to_string_pretty(&view_json(&view))?);
            } else {
                print_dashboard(&view, &session);
            }
        }

        Commands::Complete {
            step,
            difficulty,
            score,
            time,
            notes,
        } => {
            let user_id = session.require_user()?.to_string();
            if step == 0 {
                bail!("Steps are numbered from 1");
            }
            let step_index = step - 1;

            let mut dashboard =
                Dashboard::new(client, user_id).skill_policy(config.dashboard.skill_policy);
            if let Err(e) = dashboard.load().await {
                report_load_failure(&e);
                std::process::exit(1);
            }

            let input = AssessmentInput {
                difficulty_rating: difficulty,
                comprehension_score: score,
                notes,
                time_spent: time,
            };
            dashboard
                .complete_step(step_index, &input)
                .await
                .context("Step was not marked completed; you can submit it again")?;

            let view = dashboard.view();
            let title = view
                .steps
                .get(step_index)
                .map(|s| s.step.title.as_str())
                .unwrap_or("step");
            println!("Completed \"{}\"", title);
            println!(
                "Progress: {}/{} steps ({:.0}%)",
                view.completed_steps,
                view.total_steps(),
                view.completion_percent()
            );
            print_recommendations(&view);
        }

        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)?;
                    println!("Config written to {}", path.display());
                }
                None => print!("{}", content),
            }
        }
    }

    Ok(())
}

fn password_or_prompt(password: Option<String>) -> anyhow::Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }
    eprint!("Password: ");
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let password = line.trim_end_matches(&['\r', '\n'][..]).to_string();
    if password.is_empty() {
        bail!("Password is required");
    }
    Ok(password)
}

fn remember_user(
    store: &SessionStore,
    session: &mut Session,
    user_id: Option<String>,
    message: &str,
) -> anyhow::Result<()> {
    println!("{}", message);
    if let Some(id) = user_id {
        if session.user_id.as_deref() != Some(id.as_str()) {
            session.form_submitted = false;
        }
        session.user_id = Some(id);
        store.save(session)?;
    }
    Ok(())
}

fn report_load_failure(error: &DashboardError) {
    tracing::error!(error = %error, "Could not load dashboard");
    eprintln!("Could not load your dashboard: {}", error);
    if error.is_retryable() {
        eprintln!("Run the command again to refresh.");
    }
}

fn print_dashboard(view: &DashboardView<'_>, session: &Session) {
    if let Some(profile) = view.profile {
        if let Some(goal) = &profile.goal {
            println!("Goal: {}", goal);
        }
    }
    if view.steps.is_empty() {
        if session.form_submitted {
            println!("Your learning path is still being prepared.");
        } else {
            println!("No learning path yet. Run `learnpath onboard` to get one.");
        }
        return;
    }

    println!(
        "Progress: {}/{} steps ({:.0}%)\n",
        view.completed_steps,
        view.total_steps(),
        view.completion_percent()
    );

    for step in &view.steps {
        print_step(step);
    }

    if !view.skills.is_empty() {
        println!("\nSkills");
        for skill in &view.skills {
            let stars = "*".repeat(skill.level as usize);
            println!("  {:<5} {} ({:.0}%)", stars, skill.skill, skill.percent());
        }
    }

    if let Some(analytics) = view.analytics {
        let stats = &analytics.overall_stats;
        println!("\nAnalytics");
        if let Some(streak) = stats.current_streak {
            println!("  Current streak: {} days", streak);
        }
        if let Some(minutes) = stats.total_time_spent {
            println!("  Time spent: {:.0} min", minutes);
        }
        if let Some(avg) = stats.average_comprehension {
            println!("  Average comprehension: {:.0}%", avg);
        }
        if let Some(total) = stats.total_steps_completed {
            println!("  Steps completed: {}", total);
        }
    }

    if let Some(insights) = view.insights {
        if !insights.top_performing_skills.is_empty() || insights.learning_velocity.is_some() {
            println!("\nInsights");
            for skill in &insights.top_performing_skills {
                println!("  Strong in {} ({:.0})", skill.0, skill.1);
            }
            if let Some(velocity) = insights.learning_velocity {
                println!("  Velocity: {:.1} steps/week", velocity);
            }
        }
    }

    print_recommendations(view);
}

fn print_step(step: &StepView<'_>) {
    let mark = if step.updating {
        "~"
    } else if step.is_completed() {
        "x"
    } else {
        " "
    };
    let duration = step.step.duration.as_deref().unwrap_or("");
    println!("  [{}] {}. {} {}", mark, step.index + 1, step.step.title, duration);

    if let Some(detail) = step.progress.and_then(|p| p.details()) {
        if let Some(score) = detail.comprehension_score {
            println!("        comprehension {:.0}%", score);
        }
    }
}

fn print_recommendations(view: &DashboardView<'_>) {
    let sections: [(&str, &[&Recommendation]); 3] = [
        ("Next steps", &view.recommendations.next_steps),
        ("Review", &view.recommendations.reviews),
        ("Skill boosters", &view.recommendations.skill_boosters),
    ];

    for (title, recommendations) in sections {
        if recommendations.is_empty() {
            continue;
        }
        println!("\n{}", title);
        for recommendation in recommendations {
            print_recommendation(recommendation);
        }
    }
}

fn print_recommendation(recommendation: &Recommendation) {
    match recommendation {
        Recommendation::NextStep { step, context, .. } => {
            let time = context.estimated_time.as_deref().unwrap_or("?");
            let difficulty = context.difficulty.as_deref().unwrap_or("?");
            println!("  - {} ({}, {})", step.title, time, difficulty);
        }
        Recommendation::Review { step, context, .. } => {
            let reason = context.reason.as_deref().unwrap_or("worth another look");
            match context.previous_score {
                Some(score) => println!("  - {}: {} (last score {:.0})", step.title, reason, score),
                None => println!("  - {}: {}", step.title, reason),
            }
        }
        Recommendation::SkillBooster { step, context, .. } => {
            let impact = context.career_impact.as_deref().unwrap_or("");
            println!("  - {} {}", step.title, impact);
            if !context.aligned_goals.is_empty() {
                println!("      supports: {}", context.aligned_goals.join(", "));
            }
        }
        Recommendation::Unknown => {}
    }
}

fn view_json(view: &DashboardView<'_>) -> serde_json::Value {
    let steps: Vec<serde_json::Value> = view
        .steps
        .iter()
        .map(|s| {
            serde_json::json!({
                "index": s.index,
                "title": s.step.title,
                "completed": s.is_completed(),
                "updating": s.updating,
                "progress": s.progress,
            })
        })
        .collect();

    serde_json::json!({
        "profile": view.profile,
        "steps": steps,
        "completed_steps": view.completed_steps,
        "completion_percent": view.completion_percent(),
        "skills": view.skills,
        "recommendations": {
            "next_step": view.recommendations.next_steps,
            "review": view.recommendations.reviews,
            "skill_booster": view.recommendations.skill_boosters,
        },
        "analytics": view.analytics,
        "insights": view.insights,
    })
}
