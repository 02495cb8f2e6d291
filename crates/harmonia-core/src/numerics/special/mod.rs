pub mod clebsch_gordan;
pub mod factorial;
pub mod harmonics;
pub mod legendre;
pub mod sign;
pub mod wigner;

pub use clebsch_gordan::{clebsch_gordan, clebsch_gordan_doubled, ClebschGordanInput};
pub use factorial::{choose, factorial, ln_choose, ln_factorial, MAX_FINITE_FACTORIAL};
pub use harmonics::{
    coefficient_count, coefficient_index, coefficient_lm, compare, evaluate, evaluate_index,
    evaluate_sum, maximum_degree,
};
pub use legendre::associated_legendre;
pub use sign::{parity_sign, sign};
pub use wigner::{wigner_3j, Wigner3jInput};
