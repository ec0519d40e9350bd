pub mod match_dto;
