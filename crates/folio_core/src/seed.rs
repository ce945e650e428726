//! Default portfolio content used by `initialize_database` seeding.
//!
//! Blog posts name their category by display name; the bootstrap resolves
//! that to the seeded category id.

use crate::model::entries::{
    AboutItem, BlogCategory, BlogPost, Education, Experience, Project, Skill,
};

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_string()).collect()
}

pub fn about_items() -> Vec<AboutItem> {
    [
        (
            "Passionate Developer",
            "Years of experience crafting robust web applications.",
            "Code",
        ),
        (
            "Tech Enthusiast",
            "Always exploring new technologies and methodologies.",
            "Lightbulb",
        ),
        (
            "Problem Solver",
            "Analytical thinker who enjoys untangling complex challenges.",
            "BookOpen",
        ),
        (
            "Team Player",
            "Thrives in collaborative, cross-functional teams.",
            "Users",
        ),
        (
            "Global Perspective",
            "Worked on international projects across time zones.",
            "Globe",
        ),
    ]
    .into_iter()
    .map(|(title, content, icon)| AboutItem {
        title: title.to_string(),
        content: content.to_string(),
        icon: icon.to_string(),
    })
    .collect()
}

pub fn skills() -> Vec<Skill> {
    [
        ("React", "FaReact"),
        ("Node.js", "FaNodeJs"),
        ("TypeScript", "SiTypescript"),
        ("JavaScript", "SiJavascript"),
        ("Python", "FaPython"),
        ("MongoDB", "SiMongodb"),
        ("PostgreSQL", "SiPostgresql"),
        ("AWS", "FaAws"),
        ("Docker", "SiDocker"),
        ("Kubernetes", "SiKubernetes"),
    ]
    .into_iter()
    .map(|(name, icon)| Skill {
        name: name.to_string(),
        icon: icon.to_string(),
    })
    .collect()
}

pub fn experiences() -> Vec<Experience> {
    vec![
        Experience {
            company: "Northwind Systems".to_string(),
            logo: None,
            position: "Software Developer".to_string(),
            period: "Apr 2021 - Mar 2023".to_string(),
            description: "Introduced new delivery processes and shipped four projects \
                          with a team of fourteen."
                .to_string(),
            skills: strings(&["React", "Node.js", "Redux", "TypeScript", "MongoDB"]),
        },
        Experience {
            company: "Contoso Labs".to_string(),
            logo: None,
            position: "Frontend Developer Intern".to_string(),
            period: "Aug 2020 - Sep 2020".to_string(),
            description: "Built a storefront interface with search, checkout and payments \
                          within a one-month deadline."
                .to_string(),
            skills: strings(&["React", "JavaScript", "Firebase", "Bootstrap"]),
        },
    ]
}

pub fn education() -> Vec<Education> {
    vec![Education {
        university: "State College of Engineering".to_string(),
        logo: None,
        degree: "Bachelor of Engineering in Computer Science".to_string(),
        period: "2017 - 2021".to_string(),
        cgpa: "9.7".to_string(),
        subjects: strings(&[
            "Operating Systems",
            "Data Structures and Algorithms",
            "Computer Networks",
            "Compiler Design",
            "Database Management Systems",
        ]),
        description: "Focused on algorithms and software development.".to_string(),
    }]
}

pub fn projects() -> Vec<Project> {
    vec![
        Project {
            name: "Patient Monitor".to_string(),
            description: "Realtime patient monitoring dashboard with IoT sensor feeds."
                .to_string(),
            image: None,
            skills: strings(&["React", "Node.js", "MongoDB", "Redux"]),
            github: Some("https://github.com/example/patient-monitor".to_string()),
            live: None,
        },
        Project {
            name: "Live Document Editor".to_string(),
            description: "Collaborative document editor with inline comments.".to_string(),
            image: None,
            skills: strings(&["Next.js", "React", "TypeScript", "Tailwind CSS"]),
            github: Some("https://github.com/example/live-docs".to_string()),
            live: Some("https://live-docs.example.com".to_string()),
        },
        Project {
            name: "Music Browser".to_string(),
            description: "Responsive album and playlist browser.".to_string(),
            image: None,
            skills: strings(&["React", "Next.js", "Tailwind CSS"]),
            github: Some("https://github.com/example/music-browser".to_string()),
            live: None,
        },
    ]
}

pub fn blog_categories() -> Vec<BlogCategory> {
    [
        ("React", "FaReact"),
        ("JavaScript", "SiJavascript"),
        ("TypeScript", "SiTypescript"),
        ("Next.js", "SiNextdotjs"),
        ("Node.js", "FaNodeJs"),
        ("Python", "FaPython"),
    ]
    .into_iter()
    .map(|(name, icon)| BlogCategory {
        name: name.to_string(),
        icon: icon.to_string(),
    })
    .collect()
}

/// Default posts paired with the display name of their category.
///
/// `category_id` is left empty and must be filled in before insert.
pub fn blog_posts() -> Vec<(&'static str, BlogPost)> {
    [
        (
            "React",
            "Getting Started with React",
            "Create your first component.",
            "2023-06-15",
            "8 min read",
            "/blog/react-beginners-guide.jpg",
        ),
        (
            "TypeScript",
            "TypeScript vs JavaScript",
            "When to reach for each in your projects.",
            "2023-07-22",
            "10 min read",
            "/blog/typescript-vs-javascript.jpg",
        ),
        (
            "Next.js",
            "Understanding the App Router",
            "How the new router changes data loading.",
            "2023-08-05",
            "12 min read",
            "/blog/nextjs-app-router.jpg",
        ),
        (
            "Node.js",
            "Building Microservices with Node.js",
            "Designing a service architecture with Express.",
            "2023-09-10",
            "15 min read",
            "/blog/nodejs-microservices.jpg",
        ),
        (
            "Python",
            "Data Analysis with Python",
            "Pandas and NumPy for everyday analysis.",
            "2023-10-18",
            "11 min read",
            "/blog/python-data-analysis.jpg",
        ),
    ]
    .into_iter()
    .map(|(category, title, excerpt, date, read_time, image)| {
        (
            category,
            BlogPost {
                title: title.to_string(),
                excerpt: excerpt.to_string(),
                content: format!("# {title}\n\n{excerpt}\n"),
                image: Some(image.to_string()),
                date: date.to_string(),
                author: "Portfolio Author".to_string(),
                author_image: Some("/author-profile.jpg".to_string()),
                category_id: String::new(),
                read_time: read_time.to_string(),
            },
        )
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::entries::Entry;

    #[test]
    fn default_entries_pass_validation() {
        assert!(about_items().iter().all(|item| item.validate().is_ok()));
        assert!(skills().iter().all(|item| item.validate().is_ok()));
        assert!(experiences().iter().all(|item| item.validate().is_ok()));
        assert!(education().iter().all(|item| item.validate().is_ok()));
        assert!(projects().iter().all(|item| item.validate().is_ok()));
        assert!(blog_categories().iter().all(|item| item.validate().is_ok()));
    }

    #[test]
    fn default_posts_pass_validation_with_site_root_images() {
        for (_, mut post) in blog_posts() {
            post.category_id = "category".to_string();
            assert!(post.validate().is_ok(), "{}", post.title);
            assert!(post.image.as_deref().is_some_and(|image| image.starts_with("/blog/")));
        }
    }

    #[test]
    fn every_post_names_a_seeded_category() {
        let names = blog_categories()
            .into_iter()
            .map(|category| category.name)
            .collect::<Vec<_>>();
        for (category, _) in blog_posts() {
            assert!(names.iter().any(|name| name == category), "{category}");
        }
    }
}
