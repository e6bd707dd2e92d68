//! CLI definition using clap

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use dirtco_domain::model::{
    Access, Density, Difficulty, EquipmentType, PipelineStage, SoilType, TrenchDepth,
};
use dirtco_types::OutputFormat;

#[derive(Parser)]
#[command(name = "dirtco")]
#[command(version)]
#[command(about = "Quoting, job costing and customer tracking for a dirt-work contractor")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (json, table). Uses config value if not specified.
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Rate table (TOML) to price with instead of the configured one
    #[arg(long, global = true)]
    pub rates: Option<PathBuf>,

    /// Verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Price a job; with --customer the quote is saved to the CRM
    Quote {
        /// Customer ID to save the quote for
        #[arg(long, short = 'c')]
        customer: Option<String>,

        #[command(subcommand)]
        job: JobCommand,
    },

    /// Earliest start dates for a job of the given length
    Dates {
        /// Crew days the job needs
        #[arg(long, short = 'd')]
        days: f64,

        /// Booked date (YYYY-MM-DD); repeat for more
        #[arg(long, short = 'b')]
        booked: Vec<String>,

        /// CSV file of booked dates, one per row
        #[arg(long)]
        booked_csv: Option<PathBuf>,

        /// Also block days taken by scheduled CRM jobs
        #[arg(long)]
        include_jobs: bool,

        /// Scan from this date instead of today
        #[arg(long)]
        from: Option<NaiveDate>,
    },

    /// Score how likely a deal is to close
    Score(ScoreArgs),

    /// Manage customers
    Customer {
        #[command(subcommand)]
        action: CustomerCommand,
    },

    /// Manage leads
    Lead {
        #[command(subcommand)]
        action: LeadCommand,
    },

    /// Saved quotes
    Quotes {
        #[command(subcommand)]
        action: QuotesCommand,
    },

    /// Jobs and the sales pipeline
    Jobs {
        #[command(subcommand)]
        action: JobsCommand,
    },

    /// Business summary: counts, revenue by stage, gross profit
    Report,

    /// Show the active rate table
    Rates {
        /// Print as TOML, ready to edit and load with --rates
        #[arg(long)]
        toml: bool,
    },

    /// Manage configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Set the market multiplier (0 < m <= 1)
        #[arg(long)]
        set_market_multiplier: Option<f64>,

        /// Clear the market multiplier override
        #[arg(long)]
        clear_market_multiplier: bool,

        /// Set the record store directory
        #[arg(long)]
        set_store_dir: Option<PathBuf>,

        /// Set the rate table file
        #[arg(long)]
        set_rates_file: Option<PathBuf>,

        /// Set default output format
        #[arg(long)]
        set_output: Option<OutputFormat>,

        /// Set the author recorded on customer notes
        #[arg(long)]
        set_author: Option<String>,

        /// Reset to defaults
        #[arg(long)]
        reset: bool,
    },
}

#[derive(Subcommand, Clone)]
pub enum JobCommand {
    /// Brush clearing priced per acre
    Brush {
        /// Acres to clear
        #[arg(long, short = 'a')]
        acreage: f64,

        /// light, medium or heavy
        #[arg(long, default_value = "medium")]
        density: Density,

        /// easy, moderate or difficult
        #[arg(long, default_value = "easy")]
        access: Access,

        /// Miles from the yard
        #[arg(long, default_value_t = 0.0)]
        distance: f64,

        /// Add-on ID; repeat for more
        #[arg(long = "add-on")]
        add_ons: Vec<String>,
    },

    /// Trenching priced per linear foot
    Trench {
        /// Trench length in feet
        #[arg(long, short = 'l')]
        feet: f64,

        /// Depth in inches: 12, 18, 24 or 36
        #[arg(long, default_value = "18")]
        depth: TrenchDepth,

        /// soft, normal or hard
        #[arg(long, default_value = "normal")]
        soil: SoilType,

        /// Miles from the yard
        #[arg(long, default_value_t = 0.0)]
        distance: f64,

        /// Add-on ID; repeat for more
        #[arg(long = "add-on")]
        add_ons: Vec<String>,
    },

    /// Site prep at a half or full day rate
    SitePrep {
        /// Full day instead of half day
        #[arg(long)]
        full_day: bool,

        /// Miles from the yard
        #[arg(long, default_value_t = 0.0)]
        distance: f64,

        /// Add-on ID; repeat for more
        #[arg(long = "add-on")]
        add_ons: Vec<String>,
    },

    /// Custom work priced by the day
    Custom {
        /// Job name shown on the quote
        #[arg(long, default_value = "Custom Work")]
        name: String,

        /// Estimated crew days
        #[arg(long, short = 'd', default_value_t = 1.0)]
        days: f64,

        /// easy, normal or difficult
        #[arg(long, default_value = "normal")]
        difficulty: Difficulty,

        /// Miles from the yard
        #[arg(long, default_value_t = 0.0)]
        distance: f64,

        /// Material cost passed through to the customer
        #[arg(long, default_value_t = 0.0)]
        materials: f64,

        /// Dump fees passed through to the customer
        #[arg(long, default_value_t = 0.0)]
        dump_fees: f64,

        /// Extra labor days (cost only)
        #[arg(long, default_value_t = 0.0)]
        extra_labor_days: f64,

        /// Negotiated price replacing the computed one
        #[arg(long)]
        override_price: Option<f64>,
    },

    /// Equipment rental
    Rental {
        /// mini-excavator, skid-steer or dump-trailer
        #[arg(long, short = 'e')]
        equipment: EquipmentType,

        /// Rental days
        #[arg(long, short = 'd')]
        days: u32,

        /// Add the damage waiver
        #[arg(long)]
        waiver: bool,

        /// Certificate of Insurance on file
        #[arg(long)]
        coi: bool,

        /// Deliver to this many miles away
        #[arg(long)]
        deliver: Option<f64>,
    },

    /// Any job type with parameters as a JSON object
    Json {
        /// brush-clearing, trenching, site-prep, custom or equipment-rental
        job_type: String,

        /// Parameters, e.g. '{"acreage": 2, "density": "medium", "access": "easy"}'
        params: String,
    },
}

#[derive(Args, Clone)]
pub struct ScoreArgs {
    /// Customer has done business before
    #[arg(long)]
    pub returning: bool,

    /// Quoted job value
    #[arg(long)]
    pub value: f64,

    /// Miles from the yard
    #[arg(long, default_value_t = 0.0)]
    pub distance: f64,

    /// Margin percent
    #[arg(long)]
    pub margin: f64,

    /// A start is available within seven days
    #[arg(long)]
    pub quick_start: bool,
}

#[derive(Subcommand)]
pub enum CustomerCommand {
    /// Add a customer
    Add {
        name: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long, default_value = "")]
        address: String,
        #[arg(long, default_value = "")]
        company: String,
        /// Tag; repeat for more
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// List all customers
    List,

    /// Search by name, email, phone or company
    Search { query: String },

    /// Show one customer with notes, follow-ups and jobs
    Show { id: String },

    /// Change customer details
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        company: Option<String>,
        /// Replace tags; repeat for more
        #[arg(long = "tag")]
        tags: Option<Vec<String>>,
    },

    /// Delete a customer
    Delete { id: String },

    /// Add a note
    Note { id: String, note: String },

    /// Schedule a follow-up
    FollowUp {
        id: String,
        message: String,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
    },

    /// Mark a follow-up done by its position in the list
    CompleteFollowUp { id: String, index: usize },

    /// Export all customers to CSV
    Export {
        /// Output CSV file path
        #[arg(long, short = 'o', default_value = "customers.csv")]
        output: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum LeadCommand {
    /// Add a lead
    Add {
        name: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        phone: String,
        /// Where the lead came from (default Website)
        #[arg(long)]
        source: Option<String>,
    },

    /// List all leads
    List,

    /// Move a lead to another stage
    Stage { id: String, stage: PipelineStage },

    /// Turn a lead into a customer
    Convert { id: String },
}

#[derive(Subcommand)]
pub enum QuotesCommand {
    /// List saved quotes
    List,

    /// Show a saved quote
    Show { id: String },

    /// Accept a quote and open a job
    Accept { id: String },

    /// Close probability of a saved quote
    Score { id: String },

    /// Print the customer-facing quote document
    Document { id: String },

    /// Export a quote to Excel
    Export {
        id: String,
        /// Output Excel file path
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum JobsCommand {
    /// List jobs
    List {
        /// Only jobs for this customer
        #[arg(long, short = 'c')]
        customer: Option<String>,
    },

    /// Search jobs by customer, job type or ID
    Search { query: String },

    /// Show a job
    Show { id: String },

    /// Move a job to another stage
    Stage { id: String, stage: PipelineStage },

    /// Book a job's start date
    Schedule { id: String, start: NaiveDate },

    /// Jobs grouped by pipeline stage
    Pipeline,
}
