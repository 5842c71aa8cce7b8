use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct NewsItem {
    pub title: &'static str,
    pub link: &'static str,
    pub snippet: &'static str,
    pub source: &'static str,
    /**
     * Relative time as shown to residents, e.g. "2 hours ago"
     */
    pub published: &'static str,
    pub category: &'static str,
}

#[derive(Debug, Serialize)]
pub struct TrendingTopic {
    pub topic: &'static str,
    pub volume: u32,
}

pub static NEWS: [NewsItem; 6] = [
    NewsItem {
        title: "Austin City Council approves $2.8M for homeless services",
        link: "https://www.kvue.com/article/news/local/homeless/austin-homeless-strategy-budget/269-a7071a72-8f5e-4f3c-9fb5-5ccf317a3b5f",
        snippet: "The Austin City Council has approved additional funding for homeless services amid increasing concerns from residents.",
        source: "KVUE",
        published: "2 hours ago",
        category: "housing",
    },
    NewsItem {
        title: "CapMetro announces delays on MetroRail due to maintenance",
        link: "https://www.kxan.com/traffic/capmetro-announces-delays-on-metrorail-due-to-maintenance/",
        snippet: "CapMetro has announced temporary delays on the MetroRail Red Line due to scheduled maintenance work.",
        source: "KXAN",
        published: "5 hours ago",
        category: "transit",
    },
    NewsItem {
        title: "Austin Police Department launches new community safety initiative",
        link: "https://www.statesman.com/story/news/local/2023/03/12/austin-police-department-announces-new-safety-initiative/70428052007/",
        snippet: "APD announced a new community safety initiative aimed at reducing crime rates in targeted areas of the city.",
        source: "Austin American-Statesman",
        published: "1 day ago",
        category: "safety",
    },
    NewsItem {
        title: "New affordable housing complex breaks ground in East Austin",
        link: "https://www.kut.org/austin/2023-03-11/new-affordable-housing-project-east-austin",
        snippet: "Construction has begun on a new affordable housing complex that will provide 135 units for low-income residents.",
        source: "KUT",
        published: "2 days ago",
        category: "housing",
    },
    NewsItem {
        title: "Austin experiences flash flooding after heavy rainfall",
        link: "https://www.fox7austin.com/news/central-texas-flash-flooding-heavy-rainfall",
        snippet: "Several neighborhoods in Austin experienced flash flooding following unexpected heavy rainfall yesterday.",
        source: "FOX 7 Austin",
        published: "12 hours ago",
        category: "safety",
    },
    NewsItem {
        title: "City approves expansion of bike lanes in downtown Austin",
        link: "https://www.austinmonitor.com/stories/2023/03/city-approves-expansion-of-bike-lanes-in-downtown-austin/",
        snippet: "The Austin Transportation Department has approved plans to expand bike lanes throughout the downtown area.",
        source: "Austin Monitor",
        published: "3 days ago",
        category: "transit",
    },
];

pub static TRENDING: [TrendingTopic; 5] = [
    TrendingTopic { topic: "Austin flood", volume: 21500 },
    TrendingTopic { topic: "CapMetro delays", volume: 15200 },
    TrendingTopic { topic: "Austin housing prices", volume: 12800 },
    TrendingTopic { topic: "Austin crime rate", volume: 11300 },
    TrendingTopic { topic: "SXSW 2024", volume: 9800 },
];

/**
 * News items in seed order, optionally narrowed to one exact category
 *
 * An empty category is treated the same as no category at all.
 */
pub fn lookup(category: Option<&str>) -> Vec<&'static NewsItem> {
    match category.filter(|c| !c.is_empty()) {
        Some(category) => NEWS.iter().filter(|item| item.category == category).collect(),
        None => NEWS.iter().collect(),
    }
}
