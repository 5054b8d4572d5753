mod identifiers;
mod logging;
mod retrieval;
