mod clinic_repository;
mod donor_repository;
mod request_repository;

pub use clinic_repository::ClinicRepository;
pub use donor_repository::DonorRepository;
pub use request_repository::RequestRepository;
