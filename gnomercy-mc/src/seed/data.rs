//! Static content pools for sample catalog generation

use gnomercy_common::db::models::Genre;

pub const MODULE_NAMES: &[&str] = &[
    "Caves & Chimaeras",
    "Spellstorm",
    "The Dwarves of Mount Wyrm",
    "Lair of the Necromancer",
    "Siege of Goblin Tower",
    "The Barbarian Raid",
    "Phantasmagorium Ex",
    "Seance at Sunrise",
    "Chateau Rouge",
    "Blood in the Moonlight",
    "Shadows of the Candelabra",
    "Mister Mausoleum",
    "Rope, Cloak, and Scream",
    "Never Stop Running",
    "A Knife in the Night",
    "The Shape",
    "Sunk to the Hilt",
    "Buzzsaw Ballet",
    "Hot Lead Lights My Cigarette",
    "Dirt Poor and Dog Tired",
    "A Slug Too Far",
    "Bloated, Bruised, and Bloodshot",
    "Killer Curves, Steel Nerves",
    "When It Rains, It Pours",
    "Draw Quick And True",
    "You Ask, My Gun Answers",
    "This Train Won't Rob Itself",
    "Coffins and Coffee",
    "Reload!",
    "No Peace At Noon",
    "Redshift",
    "Incident at Ganymede Station",
    "Surface Gravity",
    "Android Hunter",
    "Temporal Displacement",
    "Countdown to Warp",
    "On Assignment",
    "Treasure of the Mummy's Tomb",
    "X Marks the Spot",
    "Dirigible Race",
    "Digging For Clues",
    "Pirates of Spider Bay",
    "Yes, And...",
    "This Pun's For You",
    "Rickets the Clown",
    "Open Mic",
    "Harold",
    "Punch Up",
    "Hero Can't Die",
    "Unlimited Bullets",
    "Innocent Bystander",
    "Slow Motion Explosion",
    "We Can Kill It If It Bleeds",
    "Brawn Not Brains",
    "Fluttering Hearts",
    "Swaying Hips Supple Lips",
    "Rugged Wrangler",
    "Thorns of the Black Rose",
    "Last Call, Kiss Me Before The Bar Closes",
    "Midnight at the Masquerade",
];

/// Ready-made review texts with the rating each one expresses
pub const REVIEW_POOL: &[(&str, i64)] = &[
    ("The drama was exceptional, absolutely loved it!", 5),
    ("My favorite Gnomercy module to date!", 5),
    ("The puzzles were so intricate, solving them was super satisfying.", 5),
    ("Great story and thrilling adventure.", 5),
    ("A delightful roleplaying experience!", 5),
    ("Thrilling adventure that left me wanting more.", 5),
    ("Perfectly structured and designed module.", 5),
    ("Incredible presentation and top-notch action.", 5),
    ("Simply outstanding! An absolute masterpiece.", 5),
    ("Couldn't get enough of the amazing action.", 5),
    ("Top-notch quality, worth every penny.", 5),
    ("Highly recommended for roleplaying enthusiasts.", 5),
    ("Exquisite puzzles that scratched that itch.", 5),
    ("A gem of a module, impeccable in every aspect.", 5),
    ("Excellent selection of encounters in this module.", 5),
    ("A fantastic roleplaying experience overall.", 5),
    ("Good vibes and cozy atmosphere.", 4),
    ("Enjoyed the adventure, would definitely recommend for new players", 4),
    ("Reasonable encounters and well paced.", 4),
    ("The atmosphere was lovely, perfect for a date night.", 4),
    ("Good premise, but the encounters could have been better.", 4),
    ("Pleasantly surprised by the variety of loot.", 4),
    ("Well-designed puzzles and engaging encounters.", 4),
    ("Satisfying puzzles, suitable for any player regardless of experience.", 4),
    ("Really cool premise, but the adventure was just okay.", 3),
    ("Decent experience, but nothing extraordinary.", 3),
    ("Average, could be better.", 3),
    ("The module was okay, nothing special.", 3),
    ("module could be better, but the experience was fine.", 3),
    ("An average experience, didn't leave a lasting impression.", 3),
    ("Story was poorly paced, and the puzzles were disappointing.", 2),
    ("Expected more, but left unsatisfied.", 2),
    ("Underwhelming NPCs and presentation.", 2),
    ("Disappointing experience overall.", 2),
    ("Expected more value for the price.", 2),
    ("Mediocre story and lackluster presentation.", 2),
    ("Regret spending money on such a disappointing module.", 2),
    ("Not up to par with my expectations.", 2),
    ("This module was terrible, too difficult and confusing", 1),
    ("Worst Gnomercy experience I've had so far.", 1),
    ("Avoid this module, the story was inane.", 1),
    ("Unpleasant and tasteless story.", 1),
];

/// Genre-matched description candidates
pub fn descriptions_for(genre: Genre) -> &'static [&'static str] {
    match genre {
        Genre::Action => &[
            "You're surrounded by mercenaries out for blood. Good thing you've got more bullets than brain cells. Time to shoot your way out of trouble.",
            "A genocidal alien has crash landed on Earth. Your muscles are the only thing between it and total planetary destruction.",
            "A little girl has been kidnapped. The coppers are incompetent, the mayor corrupt, and the family is desperate. You're a washed up has-been bodyguard but it's time to dry out and start punching bad guys.",
        ],
        Genre::Adventure => &[
            "You're a globetrotter in search of the last undiscovered ancient civilization. Traverse the jungles to find the mythical city of Xolum-ra.",
            "Hired by reclusive billionaire Rex Menace, your team is tasked with finding the lost treasure of Mahn Dien. But all is not what it seems...",
            "Pirates have pillaged your hometown and stolen the beloved golden crow statuette from the museum. You have to hunt them down and retrieve that bird!",
        ],
        Genre::Comedy => &[
            "Your set at the Giggle Factory has gone viral and now you've been hired as a writer on the Late Night Show. Are you actually funny or was your viral set a flash in the pan?",
            "You're a comedy troupe traveling across the country performing for the masses.",
            "Improv, one liners, slapstick - joke for your life in this module straight out of the funny pages!",
        ],
        Genre::Fantasy => &[
            "The dragons have returned and are causing problems in the township of Crescent Grove. You're on a quest to find the sorcerer responsible and compel them to banish the dragons back to the nether realm.",
            "The high council of Er has forbid magic across the realm. Far in the north a cohort of casters band together to rebel against the law.",
            "The gnomes have built a flying machine and intend to fly to the moon to mine precious metals. You must decide to join them or stop the operation for good.",
        ],
        Genre::Noir => &[
            "A woman, a gun, a car, and a million bucks. What could go wrong? Navigate the booze fueled twists and turns of this murder mystery.",
            "That damn dame just spent your last dime. The bookie's calling and the rent's due. But the hot corruption case that just landed in your lap could turn your luck...",
            "You've got one bullet, one cigarette, one beer and a hell of a lot of problems.",
        ],
        Genre::Horror => &[
            "Spooky vibes, thrilling rides and haunted joints. Never has being scared to death been so fun!",
            "Shriek into the night as you become the hunted. A vampire on the loose wreaks havoc in the village, your party arrives to hunt the undead menace and save the village. But everything is not what it seems...",
            "Stare into the cosmic abyss, question reality and grasp the frayed ends of sanity!",
        ],
        Genre::Romance => &[
            "Dance with someone and feel the heat. This module has it all - lust, betrayal, love, and miscommunication. Don't miss the chance to roleplay your deepest desires.",
            "Ride into bliss with this fiery module chock full of longing glances, whirlwind courtships and broken hearts.",
            "Meet cute in the gothic castle and turn into a creature of the night.",
        ],
        Genre::Scifi => &[
            "In a parallel reality where their characters don't exist, players must discover why they've been erased from history and who's responsible!",
            "When the sun dies, residents of Planet O migrate to space station Ugh. Natives and migrants clash as resources become scarce. Players are caught in the middle of the scuffle and must find a path to peace.",
            "AI scumlords have written a lucrative algorithm that could solve the world's problems but melts the minds of the destitute in the process. Players must decide if that's an acceptable cost for the promise of a utopian future.",
        ],
        Genre::Western => &[
            "Armed only with a sixgun, faded wanted poster, and this morning's hangover players must muster all they got to outwit and outdo the dreaded criminal Big Earl in this module.",
            "Tumbelweed and twisters. Whiskey and wagons. Prospectors and moonshiners. Players navigate it all in this wild west module!",
            "A robbery gone awry. A train derailment. The U.S. Marshals and a zealot out for revenge. This module packs a punch!",
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_genre_has_descriptions() {
        for genre in Genre::ALL {
            assert!(!descriptions_for(genre).is_empty());
        }
    }

    #[test]
    fn test_review_pool_ratings_are_in_range() {
        for (text, rating) in REVIEW_POOL {
            assert!((1..=5).contains(rating), "bad rating for {text:?}");
            assert!(!text.trim().is_empty());
        }
    }
}
