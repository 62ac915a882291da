//! Tournament win-probability CLI
//!
//! Builds features from raw results, trains and cross-validates the model,
//! and writes calibrated predictions.

use clap::{Parser, Subcommand};
use mania::{Config, Result};

#[derive(Parser)]
#[command(name = "mania")]
#[command(about = "Tournament matchup win probabilities via logistic regression", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "mania.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read raw competition data and write feature tables
    BuildFeatures {
        /// Directory with the raw CSV files
        #[arg(long)]
        data_dir: Option<String>,
        /// Output directory for feature tables
        #[arg(long)]
        out_dir: Option<String>,
    },
    /// Cross-validate and train the model on the training features
    Train {
        /// Directory holding features_train.csv
        #[arg(long)]
        art_dir: Option<String>,
        /// Output directory for model.json
        #[arg(long)]
        out_dir: Option<String>,
        /// Number of season-grouped folds
        #[arg(short = 'k', long)]
        folds: Option<usize>,
        /// Seed for season assignment
        #[arg(long)]
        seed: Option<u64>,
        /// Ignore training rows before this season
        #[arg(long)]
        min_season: Option<i32>,
        /// Override number of epochs
        #[arg(long)]
        epochs: Option<usize>,
        /// Override learning rate
        #[arg(long)]
        lr: Option<f64>,
    },
    /// Predict the test features and write a submission
    Predict {
        /// Directory holding model.json and features_test.csv
        #[arg(long)]
        art_dir: Option<String>,
        /// Output directory for submission.csv
        #[arg(long)]
        out_dir: Option<String>,
        /// Temperature for log-odds scaling (>1 flattens)
        #[arg(long)]
        temperature: Option<f64>,
        /// Lower clip bound
        #[arg(long)]
        clip_lo: Option<f64>,
        /// Upper clip bound
        #[arg(long)]
        clip_hi: Option<f64>,
    },
    /// Write a default config file
    Init,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load or create config
    let mut config = if std::path::Path::new(&cli.config).exists() {
        match Config::load(&cli.config) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        Config::default()
    };

    let result = match cli.command {
        Commands::BuildFeatures { data_dir, out_dir } => {
            if let Some(d) = data_dir {
                config.data.data_dir = d;
            }
            if let Some(o) = out_dir {
                config.data.artifacts_dir = o;
            }
            commands::build_features(&config)
        }
        Commands::Train {
            art_dir,
            out_dir,
            folds,
            seed,
            min_season,
            epochs,
            lr,
        } => {
            if let Some(a) = art_dir {
                config.data.artifacts_dir = a;
            }
            if let Some(k) = folds {
                config.training.folds = k;
            }
            if let Some(s) = seed {
                config.training.seed = s;
            }
            if min_season.is_some() {
                config.training.min_season = min_season;
            }
            if let Some(e) = epochs {
                config.training.optimizer.epochs = e;
            }
            if let Some(lr) = lr {
                config.training.optimizer.learning_rate = lr;
            }
            let out_dir = out_dir.unwrap_or_else(|| config.data.artifacts_dir.clone());
            commands::train(&config, &out_dir)
        }
        Commands::Predict {
            art_dir,
            out_dir,
            temperature,
            clip_lo,
            clip_hi,
        } => {
            if let Some(a) = art_dir {
                config.data.artifacts_dir = a;
            }
            if let Some(o) = out_dir {
                config.data.submission_dir = o;
            }
            if let Some(t) = temperature {
                config.calibration.temperature = t;
            }
            if let Some(lo) = clip_lo {
                config.calibration.clip_lo = lo;
            }
            if let Some(hi) = clip_hi {
                config.calibration.clip_hi = hi;
            }
            commands::predict(&config)
        }
        Commands::Init => commands::init(&cli.config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

mod commands {
    use super::*;
    use mania::data::reader::{self, ReadOptions};
    use mania::data::writer;
    use mania::features::FeatureSet;
    use mania::features::RawData;
    use mania::model::LogisticModel;
    use mania::predict::Predictor;
    use mania::training::{self, LabeledSet, Trainer};
    use mania::ManiaError;
    use std::path::Path;

    const MODEL_FILE: &str = "model.json";

    fn read_options(config: &Config) -> ReadOptions {
        ReadOptions {
            skip_malformed: config.data.skip_malformed_rows,
        }
    }

    pub fn init(config_path: &str) -> Result<()> {
        let config = Config::default();
        config.save(config_path)?;
        println!("Created default config at {}", config_path);

        println!("\nNext steps:");
        println!("  1. Put the competition CSV files in {}/", config.data.data_dir);
        println!("  2. Run 'mania build-features'");
        println!("  3. Run 'mania train'");
        println!("  4. Run 'mania predict'");

        Ok(())
    }

    pub fn build_features(config: &Config) -> Result<()> {
        let data_dir = Path::new(&config.data.data_dir);
        let out_dir = Path::new(&config.data.artifacts_dir);

        let raw = RawData::load(data_dir, read_options(config))?;
        let features = FeatureSet::build(&raw, &config.elo, config.data.ranking_system.as_deref())?;

        let agg_path = writer::write_team_seasons(out_dir, &features.team_seasons)?;
        let train_path =
            writer::write_matchups(out_dir, writer::TRAIN_FEATURES_FILE, &features.train)?;
        let test_path = writer::write_matchups(out_dir, writer::TEST_FEATURES_FILE, &features.test)?;

        println!("Done.");
        println!("- {}", agg_path.display());
        println!("- {}", train_path.display());
        println!("- {}", test_path.display());
        Ok(())
    }

    pub fn train(config: &Config, out_dir: &str) -> Result<()> {
        config.calibration.validate()?;
        let train_path = Path::new(&config.data.artifacts_dir).join(writer::TRAIN_FEATURES_FILE);
        println!("Reading: {}", train_path.display());
        let rows = reader::read_matchups(&train_path, read_options(config))?.rows;

        let tc = &config.training;
        let data = LabeledSet::from_rows(&rows, tc.min_season);
        if data.is_empty() {
            return Err(ManiaError::Config(format!(
                "No labeled rows in {}{}",
                train_path.display(),
                tc.min_season
                    .map(|s| format!(" from season {} on", s))
                    .unwrap_or_default()
            )));
        }
        println!("Training rows: {}", data.len());

        let trainer = Trainer::new(tc.optimizer.clone());
        let report = training::cross_validate(
            &rows,
            &trainer,
            tc.folds,
            tc.seed,
            tc.min_season,
            &config.calibration,
        );
        for fold in &report.folds {
            println!("{}", fold);
        }
        println!("{}", report);

        let model = trainer.fit(&data.x, &data.y, &training::feature_names());
        let model_path = Path::new(out_dir).join(MODEL_FILE);
        model.save(&model_path)?;
        println!("Saved model: {}", model_path.display());

        Ok(())
    }

    pub fn predict(config: &Config) -> Result<()> {
        config.calibration.validate()?;
        let art_dir = Path::new(&config.data.artifacts_dir);
        let model_path = art_dir.join(MODEL_FILE);
        let model = LogisticModel::load(&model_path)?;
        println!("Loaded model: {}", model_path.display());

        let test_path = art_dir.join(writer::TEST_FEATURES_FILE);
        let rows = reader::read_matchups(&test_path, read_options(config))?.rows;

        let cal = &config.calibration;
        println!(
            "Calibration: temperature={} clip=[{}, {}]",
            cal.temperature, cal.clip_lo, cal.clip_hi
        );
        let predictor = Predictor::new(model, cal.clone())?;
        let submission = predictor.predict_all(&rows);

        let out_path = writer::write_submission(Path::new(&config.data.submission_dir), &submission)?;
        println!("Wrote: {}", out_path.display());

        Ok(())
    }
}
