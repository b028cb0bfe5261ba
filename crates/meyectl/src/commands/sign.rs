//! Signed-URL debugging aid.
//!
//! A signature mismatch on the wire is indistinguishable from bad
//! credentials; printing what this client would send makes it possible
//! to compare against the server's expectation by hand.

use motioneye_api::{CameraRegistry, QueryParams};

use crate::cli::SignArgs;
use crate::error::CliError;

pub fn handle(registry: &CameraRegistry, args: SignArgs) -> Result<(), CliError> {
    let client = registry.client();
    let params: QueryParams = args.params.into_iter().collect();
    let signed = client.sign(&args.method.to_uppercase(), &args.path, &params, None);
    println!("{}{}", client.base_url(), signed);
    Ok(())
}
