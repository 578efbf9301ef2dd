pub mod arcades;
pub mod friends;
pub mod games;
pub mod promos;
pub mod reservations;
pub mod scores;
pub mod tickets;
pub mod users;

pub use arcades::{Arcade, ArcadeGame, GameOnArcade, NewArcade};
pub use friends::{FriendRequestDetail, Friendship, FriendshipStatus};
pub use games::{ArcadePlacement, ArcadePopularity, Game, GamePatch, NewGame};
pub use promos::{
    NewPromoCode, PromoCode, PromoCodePatch, PromoDenial, PromoUse, PromoUseDetail, normalize_code,
};
pub use reservations::{QueueEntry, Reservation, ReservationDetail, ReservationStatus};
pub use scores::{Score, ScoreDetail};
pub use tickets::{PurchaseDetail, TicketOffer, TicketPurchase};
pub use users::{NewUser, User, UserPatch};
