// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Web3 University

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use alloy::primitives::Address;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use web3_university::auth::{end_session, AuthContext};
use web3_university::blockchain::{ChainClient, TxSender};
use web3_university::config::{self, ClientConfig};
use web3_university::dashboard::{student_summary, teacher_summary};
use web3_university::graphql::{GraphQlClient, UniversityApi};
use web3_university::models::{
    CourseStatus, CreateCourseInput, CreateLearningRecordInput, CreateReviewInput,
    UpdateCourseInput, UpdateProfileInput, WalletAddress,
};
use web3_university::purchase::{ChainMarket, PurchaseFlow};
use web3_university::query_cache::QueryCache;
use web3_university::session::{FileTokenStore, SessionPaths, TokenStore};
use web3_university::upload::Uploader;
use web3_university::wallet::{LocalWallet, WalletConnection, WalletError, WalletSigner};
use web3_university::Error;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Json,
    Pretty,
}

#[derive(Parser, Debug)]
#[command(name = "web3-university", about = "Web3 University marketplace client", version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    #[arg(
        long,
        global = true,
        env = config::GRAPHQL_ENDPOINT_ENV,
        value_name = "URL",
        help = "GraphQL API endpoint"
    )]
    graphql_endpoint: Option<String>,

    #[arg(
        long,
        global = true,
        env = config::RPC_URL_ENV,
        value_name = "URL",
        help = "Chain JSON-RPC endpoint"
    )]
    rpc_url: Option<String>,

    #[arg(
        long,
        global = true,
        env = config::DATA_DIR_ENV,
        value_name = "DIR",
        help = "Directory holding the persisted session"
    )]
    data_dir: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        env = config::WALLET_PRIVATE_KEY_ENV,
        hide_env_values = true,
        value_name = "HEX",
        help = "Hex private key of the wallet"
    )]
    private_key: Option<String>,

    #[arg(
        long,
        global = true,
        env = config::WALLET_KEY_PEM_PATH_ENV,
        value_name = "FILE",
        help = "PEM private key file of the wallet"
    )]
    key_pem: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        env = config::LOG_FORMAT_ENV,
        value_enum,
        default_value = "pretty",
        help = "Log output format"
    )]
    log_format: LogFormat,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in with the configured wallet
    Login,
    /// Forget the persisted session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Update username, email or avatar
    UpdateProfile {
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        avatar_url: Option<String>,
    },
    /// List catalog courses
    Courses {
        #[arg(long)]
        status: Option<CourseStatus>,
        #[arg(long, value_name = "ADDRESS")]
        teacher: Option<String>,
    },
    /// Show a course with its lessons
    Course { id: String },
    /// Show a course as recorded on chain
    ChainCourse { id: String },
    /// Create a course taught by the wallet
    CreateCourse {
        #[arg(long)]
        title: String,
        #[arg(long, value_name = "YD")]
        price: f64,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        video_url: Option<String>,
        #[arg(long)]
        thumbnail_url: Option<String>,
    },
    /// Edit a course
    UpdateCourse {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, value_name = "YD")]
        price: Option<f64>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        video_url: Option<String>,
        #[arg(long)]
        thumbnail_url: Option<String>,
        #[arg(long)]
        status: Option<CourseStatus>,
    },
    /// Delete a course
    RemoveCourse { id: String },
    /// List the wallet's learning records
    Records {
        #[arg(long)]
        course: Option<String>,
    },
    /// Mark a course (or one of its lessons) as completed
    Complete {
        course_id: String,
        #[arg(long)]
        lesson: Option<String>,
    },
    /// List YD transactions of the wallet
    Transactions,
    /// Review a course
    Review {
        course_id: String,
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
        rating: u8,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Approve YD and purchase a course
    Purchase { course_id: String },
    /// Upload a file and print its public URL
    Upload {
        path: PathBuf,
        /// Also upload a frame of the video as its thumbnail
        #[arg(long)]
        thumbnail: bool,
    },
    /// Show ETH and YD balances
    Balance {
        #[arg(long)]
        address: Option<Address>,
    },
    /// List course certificates held by a student
    Certificates {
        #[arg(long)]
        address: Option<Address>,
    },
    /// Count teacher badges
    Badges {
        #[arg(long)]
        address: Option<Address>,
    },
    /// Enrollment and progress summary
    StudentDashboard,
    /// Courses, students, earnings and rating summary
    TeacherDashboard,
    /// Keep the session in sync with the wallet connection until Ctrl-C
    Watch,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.global.log_format);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Command failed");
            eprintln!("error: {}", e.short_message());
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry();

    match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_current_span(true)
                    .with_filter(env_filter),
            )
            .init(),
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .pretty()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_filter(env_filter),
            )
            .init(),
    }
}

/// Wiring shared by every command.
struct App {
    config: ClientConfig,
    api: UniversityApi,
    store: Arc<dyn TokenStore>,
    wallet: Option<LocalWallet>,
}

impl App {
    fn new(global: &GlobalArgs) -> Result<Self, Error> {
        let mut config = ClientConfig::from_env()?;
        if let Some(endpoint) = &global.graphql_endpoint {
            config.graphql_endpoint = endpoint.clone();
        }
        if let Some(rpc_url) = &global.rpc_url {
            config.rpc_url = rpc_url.clone();
        }
        if let Some(data_dir) = &global.data_dir {
            config.data_dir = data_dir.clone();
        }

        let client = GraphQlClient::new(&config.graphql_endpoint, config.http_timeout)?;
        let api = UniversityApi::new(client).with_cache(Arc::new(QueryCache::default()));
        let store: Arc<dyn TokenStore> =
            Arc::new(FileTokenStore::new(SessionPaths::new(&config.data_dir)));

        let wallet = match (&global.private_key, &global.key_pem) {
            (Some(hex), _) => Some(LocalWallet::from_hex(hex)?),
            (None, Some(path)) => Some(LocalWallet::from_pem_file(path)?),
            (None, None) => None,
        };

        info!(
            graphql = %config.graphql_endpoint,
            network = config.network.name,
            wallet = ?wallet.as_ref().map(|w| w.address()),
            "Client configured"
        );

        Ok(Self {
            config,
            api,
            store,
            wallet,
        })
    }

    fn wallet(&self) -> Result<&LocalWallet, Error> {
        self.wallet.as_ref().ok_or(Error::Wallet(WalletError::NotConfigured))
    }

    fn wallet_address(&self) -> Result<WalletAddress, Error> {
        Ok(WalletAddress::from(self.wallet()?.address()))
    }

    fn address_or_wallet(&self, address: Option<Address>) -> Result<Address, Error> {
        match address {
            Some(address) => Ok(address),
            None => Ok(self.wallet()?.address()),
        }
    }

    fn auth(&self) -> Result<Arc<AuthContext>, Error> {
        let signer: Arc<dyn WalletSigner> = Arc::new(self.wallet()?.clone());
        Ok(Arc::new(AuthContext::new(
            self.api.clone(),
            self.store.clone(),
            signer,
            WalletConnection::new(),
        )))
    }

    /// Attach the persisted token, if any, without touching the wallet.
    async fn attach_session(&self) -> Result<bool, Error> {
        match self.store.load()? {
            Some(session) => {
                self.api.set_auth_token(&session.token).await;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn chain(&self) -> Result<ChainClient, Error> {
        Ok(ChainClient::new(
            self.config.network,
            &self.config.rpc_url,
            self.config.contracts,
        )?)
    }

    fn sender(&self) -> Result<TxSender, Error> {
        Ok(TxSender::new(
            self.config.network,
            &self.config.rpc_url,
            self.config.contracts,
            self.wallet()?.ethereum_wallet(),
        )?
        .with_receipt_polling(self.config.receipt_poll_interval, self.config.receipt_timeout))
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(cli: Cli) -> Result<(), Error> {
    let app = App::new(&cli.global)?;

    match cli.command {
        Command::Login => {
            let auth = app.auth()?;
            auth.connection().connect(app.wallet_address()?);
            let outcome = auth.login().await;
            print_json(&json!({
                "login": &outcome,
                "user": auth.user().await,
            }))?;
            outcome.into_result().map_err(Error::from)
        }
        Command::Logout => {
            // Works without a wallet, so no AuthContext is built.
            end_session(app.store.as_ref(), &app.api).await;
            info!("Logged out");
            Ok(())
        }
        Command::Whoami => {
            let auth = app.auth()?;
            if !auth.restore().await? {
                return Err(web3_university::auth::AuthError::NotAuthenticated.into());
            }
            print_json(&auth.fetch_user().await?)
        }
        Command::UpdateProfile {
            username,
            email,
            avatar_url,
        } => {
            let auth = app.auth()?;
            auth.restore().await?;
            let input = UpdateProfileInput {
                username,
                email,
                avatar_url,
            };
            print_json(&auth.update_profile(&input).await?)
        }
        Command::Courses { status, teacher } => {
            app.attach_session().await?;
            print_json(&app.api.courses(status.as_ref(), teacher.as_deref()).await?)
        }
        Command::Course { id } => {
            app.attach_session().await?;
            let detail = app.api.course(&id).await?;
            print_json(&json!({
                "course": detail,
                "durationHours": detail.as_ref().map(|d| d.duration_hours()),
            }))
        }
        Command::ChainCourse { id } => print_json(&app.chain()?.course(&id).await?),
        Command::CreateCourse {
            title,
            price,
            description,
            category,
            video_url,
            thumbnail_url,
        } => {
            app.attach_session().await?;
            let input = CreateCourseInput {
                title,
                description,
                price_yd: price,
                category,
                video_url,
                thumbnail_url,
                teacher_wallet_address: app.wallet_address()?,
            };
            print_json(&app.api.create_course(&input).await?)
        }
        Command::UpdateCourse {
            id,
            title,
            price,
            description,
            category,
            video_url,
            thumbnail_url,
            status,
        } => {
            app.attach_session().await?;
            let input = UpdateCourseInput {
                title,
                description,
                price_yd: price,
                category,
                video_url,
                thumbnail_url,
                status,
            };
            print_json(&app.api.update_course(&id, &input).await?)
        }
        Command::RemoveCourse { id } => {
            app.attach_session().await?;
            app.api.remove_course(&id).await?;
            print_json(&json!({ "removed": id }))
        }
        Command::Records { course } => {
            app.attach_session().await?;
            let address = app.wallet_address()?;
            print_json(&app.api.learning_records(address.as_str(), course.as_deref()).await?)
        }
        Command::Complete { course_id, lesson } => {
            app.attach_session().await?;
            let input = CreateLearningRecordInput {
                course_id,
                lesson_id: lesson,
                user_wallet_address: app.wallet_address()?,
                completed: true,
            };
            print_json(&app.api.mark_lesson_complete(&input).await?)
        }
        Command::Transactions => {
            app.attach_session().await?;
            let address = app.wallet_address()?;
            print_json(&app.api.transactions(address.as_str()).await?)
        }
        Command::Review {
            course_id,
            rating,
            comment,
        } => {
            app.attach_session().await?;
            let input = CreateReviewInput {
                course_id,
                student_wallet_address: app.wallet_address()?,
                rating,
                comment,
            };
            print_json(&app.api.create_review(&input).await?)
        }
        Command::Purchase { course_id } => {
            let market = ChainMarket::new(app.chain()?, app.sender()?);
            let flow = PurchaseFlow::new(Arc::new(market));
            print_json(&flow.purchase(&course_id).await?)
        }
        Command::Upload { path, thumbnail } => {
            app.attach_session().await?;
            let uploader = Uploader::new(app.api.clone(), app.config.http_timeout)?;
            if thumbnail {
                print_json(&uploader.upload_video_with_thumbnail(&path).await?)
            } else {
                print_json(&json!({ "publicUrl": uploader.upload_file(&path).await? }))
            }
        }
        Command::Balance { address } => {
            let owner = app.address_or_wallet(address)?;
            let chain = app.chain()?;
            print_json(&json!({
                "address": owner.to_string(),
                "native": chain.native_balance(owner).await?,
                "yd": chain.yd_balance(owner).await?,
            }))
        }
        Command::Certificates { address } => {
            let owner = app.address_or_wallet(address)?;
            print_json(&app.chain()?.certificates(owner).await?)
        }
        Command::Badges { address } => {
            let owner = app.address_or_wallet(address)?;
            let count = app.chain()?.badge_count(owner).await?;
            print_json(&json!({ "address": owner.to_string(), "badges": count }))
        }
        Command::StudentDashboard => {
            app.attach_session().await?;
            let address = app.wallet_address()?;
            let records = app.api.learning_records(address.as_str(), None).await?;
            let certificates = app.chain()?.certificate_count(app.wallet()?.address()).await?;
            print_json(&json!({
                "summary": student_summary(&records),
                "certificates": certificates,
            }))
        }
        Command::TeacherDashboard => {
            app.attach_session().await?;
            let address = app.wallet_address()?;
            let courses = app.api.courses(None, Some(address.as_str())).await?;
            let transactions = app.api.transactions(address.as_str()).await?;
            print_json(&teacher_summary(address.as_str(), &courses, &transactions))
        }
        Command::Watch => {
            let auth = app.auth()?;
            auth.restore().await?;

            let shutdown = CancellationToken::new();
            let watcher = tokio::spawn(
                auth.clone()
                    .watch_wallet(auth.connection().subscribe(), shutdown.clone()),
            );
            auth.connection().connect(app.wallet_address()?);

            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for Ctrl-C");
            }
            shutdown.cancel();
            if let Err(e) = watcher.await {
                error!(error = %e, "Wallet watcher panicked");
            }
            Ok(())
        }
    }
}
