mod promote_use_case;

pub use promote_use_case::PromoteUseCase;
