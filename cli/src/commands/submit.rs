//! SUBMIT command - Send a contact or enquiry form.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use campus_client::{CmsClient, FormReceipt};
use campus_core::{FormKind, LeadSubmission};

use super::{HumanReadable, output};

/// Arguments for the submit command.
#[derive(Args)]
pub struct SubmitArgs {
    /// Form: contact or enquiry
    pub form: FormKind,

    /// Full name of the visitor
    #[arg(long)]
    pub name: String,

    /// Email address
    #[arg(long)]
    pub email: String,

    /// Phone number
    #[arg(long)]
    pub phone: Option<String>,

    /// Message text
    #[arg(long, short)]
    pub message: Option<String>,

    /// Programme the visitor is interested in
    #[arg(long)]
    pub program: Option<String>,

    /// Page the form was sent from
    #[arg(long)]
    pub source_page: Option<String>,
}

impl From<SubmitArgs> for LeadSubmission {
    fn from(args: SubmitArgs) -> Self {
        Self {
            full_name: args.name,
            email: args.email,
            phone: args.phone,
            message: args.message,
            program: args.program,
            source_page: args.source_page,
        }
    }
}

impl HumanReadable for FormReceipt {
    fn print_human(&self) {
        println!("{}", "Submission stored".green().bold());
        println!("  {} {}", "Form:".cyan(), self.form.endpoint());
        match self.id {
            Some(id) => println!("  {} {}", "ID:".cyan(), id),
            None => println!("  {} {}", "ID:".cyan(), "(not returned)".dimmed()),
        }
    }
}

/// Execute the submit command.
pub async fn execute(client: &CmsClient, human: bool, args: SubmitArgs) -> Result<()> {
    let form = args.form;
    let lead = LeadSubmission::from(args);
    lead.validate()?;

    let receipt = client.submit_form(form, &lead).await?;
    output(&receipt, human)
}
