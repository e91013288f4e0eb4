use armor_preflight::CredentialLookup;

/// Exit status is the only success signal; nothing is printed on success.
pub(crate) fn run() {
    let outcome = armor_preflight::ensure_auth(&CredentialLookup::from_process());
    if !outcome.is_ready() {
        eprint!("{}", outcome.format_text());
        std::process::exit(1);
    }
}
