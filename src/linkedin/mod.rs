// LinkedIn API client — tracked-post listing and reaction fetching.
//
// Each submodule handles one area of the LinkedIn REST surface. Responses
// are parsed into typed structs right after the HTTP call; anything the
// parser doesn't recognise becomes an empty result rather than an error.

pub mod client;
pub mod posts;
pub mod reactions;
pub mod traits;

pub use reactions::Reaction;
pub use traits::SocialClient;
