//! Built-in scenario pools.
//!
//! Each location has fifteen everyday scenarios. Boss cards live in their own
//! pool and are mixed into every deck regardless of location.

use super::card::{Card, EmotionZone, Location};

use EmotionZone::{Happy, Unhappy};

pub fn pool_for(location: Location) -> Vec<Card> {
    match location {
        Location::School => school_cards(),
        Location::Home => home_cards(),
        Location::Playground => playground_cards(),
    }
}

pub fn school_cards() -> Vec<Card> {
    vec![
        Card::new("s1", Happy, "My teacher gave me a gold star sticker!", "Star"),
        Card::new("s2", Happy, "Playing tag with my best friend at recess!", "Activity"),
        Card::new("s3", Unhappy, "I can't find my eraser...", "Eraser"),
        Card::new("s4", Unhappy, "A classmate knocked over my water bottle, everything is wet...", "Droplets")
            .suggest("angry", "water"),
        Card::new("s5", Unhappy, "My friend doesn't want to play with me today...", "UserX")
            .suggest("sad", "hug"),
        Card::new("s6", Unhappy, "I forgot what to say in front of the class...", "MicOff")
            .suggest("nervous", "base"),
        Card::new("s7", Happy, "Lunch today is my favourite chicken nuggets!", "Utensils"),
        Card::new("s8", Happy, "I came first in the race at PE!", "Rocket"),
        Card::new("s9", Unhappy, "This maths problem is too hard, I can't solve it...", "ZapOff"),
        Card::new("s10", Unhappy, "Someone cut in front of me in line!", "AlertTriangle")
            .suggest("angry", "move"),
        Card::new("s11", Unhappy, "My marker ran dry in art class...", "PenTool"),
        Card::new("s12", Happy, "I helped my teacher carry things and got praised.", "CheckCircle2"),
        Card::new("s13", Happy, "Our beans sprouted in science class!", "Cloud"),
        Card::new("s14", Unhappy, "A classmate broke my coloured pencil...", "HeartCrack"),
        Card::new("s15", Happy, "Today is my favourite club activity.", "Music"),
    ]
}

pub fn home_cards() -> Vec<Card> {
    vec![
        Card::new("h1", Happy, "Curry rice for dinner!", "Utensils"),
        Card::new("h2", Happy, "Mum read me a story book.", "BookOpen"),
        Card::new("h3", Unhappy, "My little brother grabbed my toy and hit me!", "Hand")
            .suggest("angry", "base"),
        Card::new("h4", Unhappy, "Mum says no more TV...", "Tv"),
        Card::new("h5", Unhappy, "I broke a cup and I'm scared of being told off...", "GlassWater")
            .suggest("scared", "hug"),
        Card::new("h6", Happy, "I get to wear my favourite clothes today!", "Heart"),
        Card::new("h7", Happy, "I had a warm, bubbly bath.", "Droplets"),
        Card::new("h8", Unhappy, "I bumped into my block castle and it fell down...", "Zap"),
        Card::new("h9", Unhappy, "It's dark and I think there's a monster in my room...", "CloudLightning")
            .suggest("scared", "hug"),
        Card::new("h10", Unhappy, "I want candy but Dad says no...", "Frown"),
        Card::new("h11", Happy, "Riding bikes in the park with Dad.", "Activity"),
        Card::new("h12", Happy, "I finished the whole puzzle by myself!", "Trophy"),
        Card::new("h13", Unhappy, "My favourite blanket is in the wash and I can't hug it...", "Cloud")
            .suggest("sad", "music"),
        Card::new("h14", Happy, "Hugs with Mum and Dad before bed.", "Heart"),
        Card::new("h15", Happy, "I packed my school bag all by myself today!", "CheckCircle2"),
    ]
}

pub fn playground_cards() -> Vec<Card> {
    vec![
        Card::new("p1", Happy, "I went down the big slide all by myself!", "Rocket"),
        Card::new("p2", Happy, "A new friend shared the sandpit toys with me.", "Heart"),
        Card::new("p3", Unhappy, "I fell off the swing and scraped my knee...", "HeartCrack")
            .suggest("sad", "hug"),
        Card::new("p4", Unhappy, "The big kids won't let me on the climbing frame...", "UserX")
            .suggest("angry", "move"),
        Card::new("p5", Happy, "I learned to pump my legs on the swing!", "Activity"),
        Card::new("p6", Unhappy, "My ball rolled away and I can't find it...", "AlertTriangle"),
        Card::new("p7", Happy, "We found a ladybird on the bench!", "Star"),
        Card::new("p8", Unhappy, "It started raining and we have to go home early...", "CloudLightning")
            .suggest("sad", "draw"),
        Card::new("p9", Happy, "Ice cream after playing!", "Utensils"),
        Card::new("p10", Unhappy, "A dog barked at me really loudly...", "Zap")
            .suggest("scared", "hug"),
        Card::new("p11", Unhappy, "Someone knocked down my sandcastle...", "Frown"),
        Card::new("p12", Happy, "I crossed the monkey bars for the first time!", "Trophy"),
        Card::new("p13", Unhappy, "I waited so long for the see-saw and never got a turn...", "ZapOff")
            .suggest("worried", "water"),
        Card::new("p14", Happy, "Blowing giant bubbles with my sister.", "Cloud"),
        Card::new("p15", Happy, "My friends cheered when I scored a goal!", "CheckCircle2"),
    ]
}

pub fn boss_cards() -> Vec<Card> {
    vec![
        Card::new("b1", Unhappy, "THUNDER! It's so loud and scary!", "CloudLightning")
            .boss()
            .suggest("scared", "hug"),
        Card::new("b2", Unhappy, "I fought with my best friend and now they won't talk to me!", "HeartCrack")
            .boss()
            .suggest("sad", "draw"),
        Card::new("b3", Unhappy, "My most precious treasure is lost and I can't find it!", "Trash2")
            .boss()
            .suggest("worried", "base"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_location_has_fifteen_regular_cards() {
        for location in Location::ALL {
            let pool = pool_for(location);
            assert_eq!(pool.len(), 15, "{location}");
            assert!(pool.iter().all(|c| !c.is_boss));
        }
    }

    #[test]
    fn boss_cards_are_all_distress() {
        let bosses = boss_cards();
        assert_eq!(bosses.len(), 3);
        assert!(bosses.iter().all(|c| c.is_boss && c.zone.is_distress()));
    }

    #[test]
    fn card_ids_are_unique() {
        let mut ids: Vec<String> = Location::ALL
            .into_iter()
            .flat_map(pool_for)
            .chain(boss_cards())
            .map(|c| c.id)
            .collect();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }
}
